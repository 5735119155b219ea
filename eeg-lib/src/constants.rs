// Protocol and acquisition constants for the 8-channel EEG board

use std::time::Duration;

/// Sentinel value of the first byte of every frame (ASCII 'A')
pub const HEADER_BYTE: u8 = 0x41;

/// Size of the frame header (1 byte)
pub const HEADER_LEN: usize = 1;

/// Number of analog channels carried by a frame
pub const CHANNELS: usize = 8;

/// Size of one channel sample on the wire (24-bit big-endian)
pub const BYTES_PER_CHANNEL: usize = 3;

/// Total frame length on the wire (25 bytes)
pub const FRAME_LEN: usize = HEADER_LEN + CHANNELS * BYTES_PER_CHANNEL;

/// ADC reference voltage in volts
pub const V_REF: f64 = 5.0;

/// ADC full scale, 2^24
pub const ADC_FULL_SCALE: f64 = 16_777_216.0;

/// Gain applied when nothing else was configured
pub const DEFAULT_GAIN: f64 = 4.0;

/// Serial line rate of the acquisition board
pub const DEFAULT_BAUD_RATE: u32 = 2_086_956;

/// Number of frames the handoff channel buffers before dropping
pub const DEFAULT_HANDOFF_CAPACITY: usize = 100;

/// Size of the buffer handed to each byte source read
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Synthetic source output rate
pub const SYNTHETIC_RATE_HZ: u32 = 250;

/// Tick period of the synthetic source (~250 Hz)
pub const SYNTHETIC_TICK: Duration = Duration::from_millis(4);

/// Peak amplitude of the synthetic waveform in ADC counts (full scale is +/- 8.38M)
pub const SYNTHETIC_AMPLITUDE: f64 = 8_000_000.0;

/// Phase advance of the synthetic waveform per frame, in radians
pub const SYNTHETIC_PHASE_STEP: f64 = 0.1;

/// Port name fragments that identify the acquisition board
pub const PREFERRED_PORT_PATTERNS: &[&str] = &["usbmodem", "usbserial"];
