//! Bounded frame queue between a producer session and the decode loop.
//!
//! Enqueue never waits. When the queue is full the newest frame is dropped
//! and counted, so a slow consumer can never stall the byte source. The
//! producer closes the queue when its session ends; the consumer then drains
//! whatever is still buffered and sees end-of-stream.

use crate::error::EegError;
use crate::frame::Frame;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tracing::{debug, warn};

/// Result of a non-blocking enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Queued,
    /// Queue was full, the frame was destroyed without being decoded.
    Dropped,
    /// The sender was closed or the receiver is gone; nothing happened.
    Closed,
}

/// Counters shared by both halves of a handoff channel.
#[derive(Debug, Default)]
pub struct HandoffStats {
    queued: AtomicU64,
    dropped: AtomicU64,
}

impl HandoffStats {
    pub fn queued(&self) -> u64 {
        self.queued.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Create a handoff channel holding at most `capacity` frames.
pub fn channel(capacity: usize) -> Result<(FrameSender, FrameReceiver), EegError> {
    if capacity == 0 {
        return Err(EegError::InvalidCapacity);
    }
    let (tx, rx) = mpsc::channel(capacity);
    let stats = Arc::new(HandoffStats::default());
    Ok((
        FrameSender {
            tx: Some(tx),
            stats: stats.clone(),
        },
        FrameReceiver { rx, stats },
    ))
}

/// Producer half. Owned by exactly one session.
#[derive(Debug)]
pub struct FrameSender {
    tx: Option<mpsc::Sender<Frame>>,
    stats: Arc<HandoffStats>,
}

impl FrameSender {
    /// Enqueue without blocking, dropping the frame if the queue is full.
    pub fn send(&self, frame: Frame) -> SendOutcome {
        let Some(tx) = &self.tx else {
            return SendOutcome::Closed;
        };

        match tx.try_send(frame) {
            Ok(()) => {
                self.stats.queued.fetch_add(1, Ordering::Relaxed);
                SendOutcome::Queued
            }
            Err(TrySendError::Full(_)) => {
                let dropped = self.stats.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(dropped, "Decode buffer full, dropping frame");
                SendOutcome::Dropped
            }
            Err(TrySendError::Closed(_)) => SendOutcome::Closed,
        }
    }

    /// Close the channel. Only the first call has an effect.
    pub fn close(&mut self) {
        if self.tx.take().is_some() {
            debug!(
                queued = self.stats.queued(),
                dropped = self.stats.dropped(),
                "Handoff channel closed"
            );
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.as_ref().is_none_or(|tx| tx.is_closed())
    }

    pub fn stats(&self) -> Arc<HandoffStats> {
        self.stats.clone()
    }
}

impl Drop for FrameSender {
    fn drop(&mut self) {
        self.close();
    }
}

/// Consumer half.
#[derive(Debug)]
pub struct FrameReceiver {
    rx: mpsc::Receiver<Frame>,
    stats: Arc<HandoffStats>,
}

impl FrameReceiver {
    /// Next frame in FIFO order, or `None` once the sender closed and the
    /// backlog is drained.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }

    /// Non-waiting variant of [`FrameReceiver::recv`].
    ///
    /// `TryRecvError::Empty` means nothing is buffered yet,
    /// `TryRecvError::Disconnected` that the sender closed and the backlog is
    /// drained.
    pub fn try_recv(&mut self) -> Result<Frame, TryRecvError> {
        self.rx.try_recv()
    }

    /// Frames currently waiting in the queue.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn stats(&self) -> Arc<HandoffStats> {
        self.stats.clone()
    }
}
