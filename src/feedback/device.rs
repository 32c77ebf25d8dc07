use crate::error::HapticError;
use serde::{Deserialize, Serialize};

/// Strength of a single haptic impulse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactStrength {
    Light,
    Medium,
    Heavy,
}

/// Platform haptic engine.
///
/// Callers must check [`HapticDevice::is_supported`] before firing an impulse;
/// platforms without a haptic engine report `false` and may return
/// [`HapticError::Unavailable`] from `impact`.
pub trait HapticDevice: Send + Sync {
    fn is_supported(&self) -> bool;

    fn impact(&self, strength: ImpactStrength) -> Result<(), HapticError>;
}
