use crate::constants::DEFAULT_GAIN;
use crate::error::EegError;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Live-tunable gain shared between the decode loop and the control API.
///
/// Clones share the same value. Writes are exclusive, reads run concurrently,
/// and a write is visible to every decode that snapshots the gain after it.
#[derive(Debug, Clone)]
pub struct GainStore {
    gain: Arc<RwLock<f64>>,
}

impl GainStore {
    /// Store holding [`DEFAULT_GAIN`].
    pub fn new() -> Self {
        Self {
            gain: Arc::new(RwLock::new(DEFAULT_GAIN)),
        }
    }

    /// Store holding `gain`, validated like [`GainStore::set`].
    pub fn with_gain(gain: f64) -> Result<Self, EegError> {
        validate(gain)?;
        Ok(Self {
            gain: Arc::new(RwLock::new(gain)),
        })
    }

    pub fn get(&self) -> f64 {
        // A plain f64 cannot be left half-written, so a poisoned lock is still usable
        *self.gain.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the gain. Zero and non-finite values are rejected and leave
    /// the stored value untouched.
    pub fn set(&self, gain: f64) -> Result<f64, EegError> {
        validate(gain)?;
        *self.gain.write().unwrap_or_else(PoisonError::into_inner) = gain;
        info!(gain, "Gain updated");
        Ok(gain)
    }
}

impl Default for GainStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the decode loop reads its gain from, once per frame.
pub trait GainSource {
    fn current_gain(&self) -> f64;
}

impl GainSource for GainStore {
    fn current_gain(&self) -> f64 {
        self.get()
    }
}

/// A fixed gain. Not validated, so decoding can still reject it.
impl GainSource for f64 {
    fn current_gain(&self) -> f64 {
        *self
    }
}

fn validate(gain: f64) -> Result<(), EegError> {
    if gain == 0.0 || !gain.is_finite() {
        return Err(EegError::InvalidGain(gain));
    }
    Ok(())
}
