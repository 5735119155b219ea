use std::io;
use thiserror::Error;

/// The primary error type for the `eeg-lib` library.
#[derive(Error, Debug)]
pub enum EegError {
    #[error("No acquisition device found. Is the board connected?")]
    NoDevice,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    #[error("Invalid frame length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid frame header: {0:#04x}")]
    InvalidHeader(u8),

    #[error("Invalid gain: {0} (must be finite and non-zero)")]
    InvalidGain(f64),

    #[error("Handoff capacity must be at least 1")]
    InvalidCapacity,
}

pub type Result<T> = std::result::Result<T, EegError>;
