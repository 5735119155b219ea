//! Common test utilities and shared imports

// Shared across test files - not every helper is used in every file
#[allow(unused_imports)]
pub use bytes::Bytes;
#[allow(unused_imports)]
pub use eeg_lib::constants::{CHANNELS, FRAME_LEN, HEADER_BYTE};
#[allow(unused_imports)]
pub use eeg_lib::error::EegError;
#[allow(unused_imports)]
pub use eeg_lib::frame::Frame;

/// Decode hex string to bytes for testing
#[allow(dead_code)]
pub fn hex_to_bytes(hex_data: &str) -> Bytes {
    Bytes::from(hex::decode(hex_data).expect("Failed to decode hex"))
}

/// Frame whose channels hold `base`, `base + 1`, ... so frames are distinguishable
#[allow(dead_code)]
pub fn numbered_frame(base: i32) -> Frame {
    let mut samples = [0i32; CHANNELS];
    for (ch, s) in samples.iter_mut().enumerate() {
        *s = base + ch as i32;
    }
    Frame::from_samples(&samples)
}

/// Concatenate frames into one byte stream
#[allow(dead_code)]
pub fn stream_of(frames: &[Frame]) -> Vec<u8> {
    frames.iter().flat_map(|f| f.as_bytes().iter().copied()).collect()
}

/// Frame with small signed values around zero on every channel
#[allow(dead_code)]
pub const NEAR_ZERO_FRAME: &str = "41fffff3000012ffffe8000004fffffe00000bfffff1000020";
