use crate::constants::{ADC_FULL_SCALE, BYTES_PER_CHANNEL, CHANNELS, V_REF};
use crate::error::EegError;
use crate::frame::Frame;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Reassemble a 24-bit big-endian two's-complement sample.
pub fn decode_sample(bytes: [u8; BYTES_PER_CHANNEL]) -> i32 {
    let mut raw = ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32;
    // Sign extension for 24-bit to 32-bit
    if raw & 0x0080_0000 != 0 {
        raw |= 0xFF00_0000;
    }
    raw as i32
}

/// Truncate a sample to 24 bits, most significant byte first.
pub fn encode_sample(value: i32) -> [u8; BYTES_PER_CHANNEL] {
    [
        ((value >> 16) & 0xFF) as u8,
        ((value >> 8) & 0xFF) as u8,
        (value & 0xFF) as u8,
    ]
}

/// Convert ADC counts to volts: `(sample * V_REF) / 2^24 / gain`.
pub fn sample_to_volts(sample: i32, gain: f64) -> f64 {
    (sample as f64 * V_REF) / ADC_FULL_SCALE / gain
}

fn check_gain(gain: f64) -> Result<(), EegError> {
    if gain == 0.0 || !gain.is_finite() {
        return Err(EegError::InvalidGain(gain));
    }
    Ok(())
}

/// Decode a frame into per-channel volts.
pub fn decode_frame(frame: &Frame, gain: f64) -> Result<ChannelValues, EegError> {
    check_gain(gain)?;

    let mut volts = [0.0; CHANNELS];
    for (ch, v) in volts.iter_mut().enumerate() {
        *v = sample_to_volts(decode_sample(frame.channel_bytes(ch)), gain);
    }
    Ok(ChannelValues { volts, gain })
}

/// Decode bytes that did not come through the assembler.
///
/// Length and header are checked before anything else.
pub fn decode_bytes(bytes: &[u8], gain: f64) -> Result<ChannelValues, EegError> {
    let frame = Frame::try_from(bytes)?;
    decode_frame(&frame, gain)
}

/// Physical values of one frame, in channel order
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelValues {
    /// Volts per channel
    pub volts: [f64; CHANNELS],
    /// Gain the values were scaled with
    pub gain: f64,
}

impl ChannelValues {
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.volts.iter().copied()
    }
}

impl fmt::Display for ChannelValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (ch, v) in self.volts.iter().enumerate() {
            if ch > 0 {
                f.write_str("  ")?;
            }
            write!(f, "[{}]: {:10.6} V", ch + 1, v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_extension() {
        assert_eq!(decode_sample([0x00, 0x00, 0x01]), 1);
        assert_eq!(decode_sample([0xFF, 0xFF, 0xFF]), -1);
        assert_eq!(decode_sample([0x7F, 0xFF, 0xFF]), 8_388_607);
        assert_eq!(decode_sample([0x80, 0x00, 0x00]), -8_388_608);
    }

    #[test]
    fn test_encode_truncates_to_24_bits() {
        assert_eq!(encode_sample(-1), [0xFF, 0xFF, 0xFF]);
        assert_eq!(encode_sample(0x0123_4567), [0x23, 0x45, 0x67]);
        assert_eq!(decode_sample(encode_sample(-8_000_000)), -8_000_000);
    }

    #[test]
    fn test_zero_and_nan_gain_rejected() {
        let frame = Frame::from_samples(&[1; CHANNELS]);
        assert!(matches!(decode_frame(&frame, 0.0), Err(EegError::InvalidGain(_))));
        assert!(matches!(decode_frame(&frame, -0.0), Err(EegError::InvalidGain(_))));
        assert!(matches!(decode_frame(&frame, f64::NAN), Err(EegError::InvalidGain(_))));
    }

    #[test]
    fn test_display_format() {
        let values = ChannelValues {
            volts: [0.5, -0.25, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
            gain: 1.0,
        };
        let text = values.to_string();
        assert!(text.starts_with("[1]:   0.500000 V  [2]:  -0.250000 V"));
        assert!(text.ends_with("[8]:   1.000000 V"));
    }
}
