use crate::constants::{CHANNELS, SYNTHETIC_AMPLITUDE, SYNTHETIC_PHASE_STEP};
use crate::frame::Frame;

/// Stand-in for the acquisition board when no hardware is connected.
///
/// Every frame carries eight phase-offset sine waves, channel `ch` holding
/// `8_000_000 * sin(t + ch)` ADC counts, encoded exactly as the board encodes
/// them. The phase advances by 0.1 rad per frame.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    phase: f64,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self::with_phase(0.0)
    }

    pub fn with_phase(phase: f64) -> Self {
        Self { phase }
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// ADC counts of the next frame, without advancing the phase.
    pub fn samples(&self) -> [i32; CHANNELS] {
        let mut samples = [0; CHANNELS];
        for (ch, sample) in samples.iter_mut().enumerate() {
            *sample = (SYNTHETIC_AMPLITUDE * (self.phase + ch as f64).sin()) as i32;
        }
        samples
    }

    pub fn next_frame(&mut self) -> Frame {
        let frame = Frame::from_samples(&self.samples());
        self.phase += SYNTHETIC_PHASE_STEP;
        frame
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}
