use crate::constants::{BYTES_PER_CHANNEL, CHANNELS, FRAME_LEN, HEADER_BYTE, HEADER_LEN};
use crate::decoder::encode_sample;
use crate::error::EegError;
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

/// One 25-byte frame of the acquisition protocol.
///
/// Layout:
///
/// ```text
/// [ 0x41 ] [ ch1 b0 b1 b2 ] [ ch2 b0 b1 b2 ] ... [ ch8 b0 b1 b2 ]
/// ```
///
/// Channel samples are 24-bit big-endian two's complement. A `Frame` can only
/// be built through validating constructors, so its length and header byte
/// always hold.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Bytes,
}

impl Frame {
    /// Build a frame from raw ADC counts, truncating each value to 24 bits.
    pub fn from_samples(samples: &[i32; CHANNELS]) -> Self {
        let mut buf = BytesMut::with_capacity(FRAME_LEN);
        buf.put_u8(HEADER_BYTE);
        for &sample in samples {
            buf.put_slice(&encode_sample(sample));
        }
        Self { bytes: buf.freeze() }
    }

    /// Wraps bytes the assembler already checked.
    pub(crate) fn from_validated(bytes: Bytes) -> Self {
        debug_assert_eq!(bytes.len(), FRAME_LEN);
        debug_assert_eq!(bytes[0], HEADER_BYTE);
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The 24 payload bytes following the header
    pub fn payload(&self) -> &[u8] {
        &self.bytes[HEADER_LEN..]
    }

    /// Raw big-endian triplet of channel `index` (0-based).
    ///
    /// # Panics
    /// If `index >= CHANNELS`.
    pub fn channel_bytes(&self, index: usize) -> [u8; BYTES_PER_CHANNEL] {
        let start = HEADER_LEN + index * BYTES_PER_CHANNEL;
        [self.bytes[start], self.bytes[start + 1], self.bytes[start + 2]]
    }

    /// Check a byte slice against the frame layout without copying it.
    pub fn validate(bytes: &[u8]) -> Result<(), EegError> {
        if bytes.len() != FRAME_LEN {
            return Err(EegError::InvalidLength {
                expected: FRAME_LEN,
                actual: bytes.len(),
            });
        }
        if bytes[0] != HEADER_BYTE {
            return Err(EegError::InvalidHeader(bytes[0]));
        }
        Ok(())
    }
}

impl TryFrom<Bytes> for Frame {
    type Error = EegError;

    fn try_from(bytes: Bytes) -> Result<Self, Self::Error> {
        Frame::validate(&bytes)?;
        Ok(Self { bytes })
    }
}

impl TryFrom<&[u8]> for Frame {
    type Error = EegError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Frame::validate(bytes)?;
        Ok(Self {
            bytes: Bytes::copy_from_slice(bytes),
        })
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Frame").field(&hex::encode(&self.bytes)).finish()
    }
}
