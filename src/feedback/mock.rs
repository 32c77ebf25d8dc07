use super::device::{HapticDevice, ImpactStrength};
use crate::error::HapticError;
use parking_lot::Mutex;
use tracing::info;

/// Haptic device that records every impulse, for tests and headless runs
pub struct RecordingHaptics {
    supported: bool,
    fail_impulses: bool,
    impulses: Mutex<Vec<ImpactStrength>>,
}

impl RecordingHaptics {
    pub fn new() -> Self {
        Self {
            supported: true,
            fail_impulses: false,
            impulses: Mutex::new(Vec::new()),
        }
    }

    /// A platform without a haptic engine
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// A haptic engine whose impulses always error
    pub fn failing() -> Self {
        Self {
            fail_impulses: true,
            ..Self::new()
        }
    }

    pub fn impulses(&self) -> Vec<ImpactStrength> {
        self.impulses.lock().clone()
    }

    pub fn impulse_count(&self) -> usize {
        self.impulses.lock().len()
    }
}

impl Default for RecordingHaptics {
    fn default() -> Self {
        Self::new()
    }
}

impl HapticDevice for RecordingHaptics {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn impact(&self, strength: ImpactStrength) -> Result<(), HapticError> {
        if !self.supported {
            return Err(HapticError::Unavailable);
        }
        self.impulses.lock().push(strength);
        if self.fail_impulses {
            return Err(HapticError::Impulse {
                details: "actuator not responding".to_string(),
            });
        }
        Ok(())
    }
}

/// Haptic device for the terminal scanner: logs each impulse
pub struct LoggingHaptics;

impl HapticDevice for LoggingHaptics {
    fn is_supported(&self) -> bool {
        true
    }

    fn impact(&self, strength: ImpactStrength) -> Result<(), HapticError> {
        info!("*bzz* ({:?})", strength);
        Ok(())
    }
}
