//! Producer sessions feeding the handoff channel.
//!
//! A session owns its byte source (or synthetic clock) and the sending half
//! of the handoff. Whatever ends it (cancellation, end of stream, a read
//! error) it closes the channel and releases the source before returning.
//! Read errors are not retried.

use crate::assembler::FrameAssembler;
use crate::constants::{DEFAULT_HANDOFF_CAPACITY, DEFAULT_READ_BUFFER_SIZE, SYNTHETIC_TICK};
use crate::handoff::{FrameSender, SendOutcome};
use crate::synthetic::SyntheticSource;
use std::fmt;
use std::time::Duration;
use strum_macros::Display;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Tunables for a producer session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Frames buffered between producer and decoder
    pub capacity: usize,
    /// Size of the buffer handed to each read
    pub read_buffer_size: usize,
    /// Frame period of the synthetic source
    pub synthetic_tick: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HANDOFF_CAPACITY,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            synthetic_tick: SYNTHETIC_TICK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SourceKind {
    #[strum(to_string = "serial")]
    Serial,
    #[strum(to_string = "synthetic")]
    Synthetic,
}

/// Why a session stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Cancelled,
    /// The byte source reported end of stream.
    Exhausted,
    /// The byte source failed; the session is over for good.
    ReadError(String),
    /// The receiving half of the handoff was dropped.
    ConsumerGone,
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEnd::Cancelled => write!(f, "cancelled"),
            SessionEnd::Exhausted => write!(f, "source exhausted"),
            SessionEnd::ReadError(e) => write!(f, "read error: {}", e),
            SessionEnd::ConsumerGone => write!(f, "consumer gone"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub source: SourceKind,
    pub end: SessionEnd,
    pub frames_emitted: u64,
    pub frames_dropped: u64,
    /// Bytes skipped while resynchronizing plus any partial frame left at the end
    pub bytes_discarded: u64,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} session {}: {} frames, {} dropped, {} bytes discarded",
            self.source, self.end, self.frames_emitted, self.frames_dropped, self.bytes_discarded
        )
    }
}

/// Read from `reader` until cancelled, exhausted or failed, pushing every
/// recovered frame into `tx`.
pub async fn run_reader<R>(
    mut reader: R,
    mut tx: FrameSender,
    cancel: CancellationToken,
    read_buffer_size: usize,
) -> SessionReport
where
    R: AsyncRead + Unpin + Send,
{
    info!("Reader session started");
    let mut read_buf = vec![0u8; read_buffer_size.max(1)];
    let mut assembler = FrameAssembler::new();
    let mut frames_dropped = 0;

    let end = 'session: loop {
        let n = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Stopping reader session...");
                break SessionEnd::Cancelled;
            }
            res = reader.read(&mut read_buf) => match res {
                Ok(0) => {
                    info!("Byte source reached end of stream");
                    break SessionEnd::Exhausted;
                }
                Ok(n) => n,
                Err(e) => {
                    error!("Read error: {}", e);
                    break SessionEnd::ReadError(e.to_string());
                }
            },
        };

        debug!(bytes = hex::encode(&read_buf[..n]), "Read");
        for frame in assembler.push(&read_buf[..n]) {
            match tx.send(frame) {
                SendOutcome::Queued => {}
                SendOutcome::Dropped => frames_dropped += 1,
                SendOutcome::Closed => {
                    info!("Consumer went away");
                    break 'session SessionEnd::ConsumerGone;
                }
            }
        }
    };

    tx.close();
    drop(reader);

    let frames_emitted = assembler.frames_emitted();
    let bytes_discarded = assembler.discarded() + assembler.finish() as u64;
    let report = SessionReport {
        source: SourceKind::Serial,
        end,
        frames_emitted,
        frames_dropped,
        bytes_discarded,
    };
    info!("{}", report);
    report
}

/// Emit one synthetic frame per `tick` until cancelled.
pub async fn run_synthetic(
    mut source: SyntheticSource,
    mut tx: FrameSender,
    cancel: CancellationToken,
    tick: Duration,
) -> SessionReport {
    info!(?tick, "Synthetic session started");
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut frames_emitted = 0;
    let mut frames_dropped = 0;

    let end = loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Stopping synthetic session...");
                break SessionEnd::Cancelled;
            }
            _ = ticker.tick() => {
                frames_emitted += 1;
                match tx.send(source.next_frame()) {
                    SendOutcome::Dropped => frames_dropped += 1,
                    SendOutcome::Closed => {
                        info!("Consumer went away");
                        break SessionEnd::ConsumerGone;
                    }
                    SendOutcome::Queued => {}
                }
            }
        }
    };

    tx.close();

    let report = SessionReport {
        source: SourceKind::Synthetic,
        end,
        frames_emitted,
        frames_dropped,
        bytes_discarded: 0,
    };
    info!("{}", report);
    report
}

pub fn spawn_reader<R>(
    reader: R,
    tx: FrameSender,
    cancel: CancellationToken,
    config: SessionConfig,
) -> JoinHandle<SessionReport>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(run_reader(reader, tx, cancel, config.read_buffer_size))
}

pub fn spawn_synthetic(
    source: SyntheticSource,
    tx: FrameSender,
    cancel: CancellationToken,
    config: SessionConfig,
) -> JoinHandle<SessionReport> {
    tokio::spawn(run_synthetic(source, tx, cancel, config.synthetic_tick))
}
