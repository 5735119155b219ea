// src/output.rs

use clap::ValueEnum;
use eeg_lib::ChannelValues;
use std::io::{self, Write};
use tracing::warn;

/// How decoded frames are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `RX: [1]:   0.123456 V  [2]: ...`
    #[default]
    Text,
    /// One JSON object per frame
    Json,
    /// Decode but print nothing
    Quiet,
}

impl OutputFormat {
    pub fn render(&self, values: &ChannelValues) -> Option<String> {
        match self {
            OutputFormat::Text => Some(format!("RX: {}", values)),
            OutputFormat::Json => match serde_json::to_string(values) {
                Ok(line) => Some(line),
                Err(e) => {
                    warn!("Failed to serialize frame: {}", e);
                    None
                }
            },
            OutputFormat::Quiet => None,
        }
    }

    /// Write one rendered frame. A closed stdout comes back as an error
    /// instead of a panic.
    pub fn write_to<W: Write>(&self, out: &mut W, values: &ChannelValues) -> io::Result<()> {
        match self.render(values) {
            Some(line) => writeln!(out, "{}", line),
            None => Ok(()),
        }
    }

    pub fn print(&self, values: &ChannelValues) -> io::Result<()> {
        self.write_to(&mut io::stdout().lock(), values)
    }
}
