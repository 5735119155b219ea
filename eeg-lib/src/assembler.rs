//! Recovery of fixed-length frames from an unaligned byte stream.
//!
//! Reads from a serial port return whatever bytes happen to be available, so
//! a single read may carry half a frame, several frames, or line noise. The
//! [`FrameAssembler`] keeps an accumulator across reads and slides over it one
//! byte at a time until a header byte sits at the front, then cuts a frame.
//!
//! The protocol has no checksum. A payload byte equal to [`HEADER_BYTE`] that
//! happens to sit at the front after a resync is taken as a frame start; the
//! assembler cannot tell the difference and does not try to.

use crate::constants::{FRAME_LEN, HEADER_BYTE};
use crate::frame::Frame;
use bytes::{Buf, BytesMut};
use tracing::trace;

/// Initial accumulator capacity, a handful of frames plus one read buffer.
const ACCUMULATOR_CAPACITY: usize = 4 * FRAME_LEN + 1024;

/// Accumulates raw chunks and extracts header-aligned frames.
#[derive(Debug)]
pub struct FrameAssembler {
    buffer: BytesMut,
    discarded: u64,
    emitted: u64,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(ACCUMULATOR_CAPACITY),
            discarded: 0,
            emitted: 0,
        }
    }

    /// Append a chunk and extract every complete frame now available.
    ///
    /// The chunk is copied, the caller may reuse its read buffer right away.
    /// Frames are returned in the order their header bytes appeared.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame() {
            frames.push(frame);
        }
        frames
    }

    /// Extract a single frame, resynchronizing as needed.
    ///
    /// Returns `None` once fewer than [`FRAME_LEN`] bytes remain.
    pub fn next_frame(&mut self) -> Option<Frame> {
        while self.buffer.len() >= FRAME_LEN {
            if self.buffer[0] != HEADER_BYTE {
                // Slide one byte so alignment is eventually found under any noise
                self.buffer.advance(1);
                self.discarded += 1;
                continue;
            }

            let bytes = self.buffer.split_to(FRAME_LEN).freeze();
            self.emitted += 1;
            trace!(buffered = self.buffer.len(), "frame extracted");
            return Some(Frame::from_validated(bytes));
        }
        None
    }

    /// Bytes currently held waiting for the rest of a frame.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes dropped while searching for a header.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    pub fn frames_emitted(&self) -> u64 {
        self.emitted
    }

    /// End of stream. Any partial frame is dropped without error; returns how
    /// many bytes were thrown away.
    pub fn finish(mut self) -> usize {
        let leftover = self.buffer.len();
        self.buffer.clear();
        leftover
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}
