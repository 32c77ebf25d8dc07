use super::device::{HapticDevice, ImpactStrength};
use crate::config::FeedbackConfig;
use std::sync::Arc;
use tracing::{debug, trace};

/// User actions that produce a haptic pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    ToggleFacing,
    CaptureStart,
    Back,
}

/// Best-effort haptic feedback.
///
/// `emit` never fails: missing capability is a no-op and device errors are
/// swallowed after a debug log line.
#[derive(Clone)]
pub struct FeedbackEmitter {
    device: Option<Arc<dyn HapticDevice>>,
    strength: ImpactStrength,
}

impl FeedbackEmitter {
    pub fn new(device: Arc<dyn HapticDevice>, strength: ImpactStrength) -> Self {
        Self {
            device: Some(device),
            strength,
        }
    }

    pub fn from_config(config: &FeedbackConfig, device: Arc<dyn HapticDevice>) -> Self {
        if config.enabled {
            Self::new(device, config.strength)
        } else {
            Self::disabled()
        }
    }

    /// Emitter that never touches a device
    pub fn disabled() -> Self {
        Self {
            device: None,
            strength: ImpactStrength::Medium,
        }
    }

    pub fn emit(&self, kind: FeedbackKind) {
        let Some(device) = &self.device else {
            return;
        };

        if !device.is_supported() {
            trace!("Haptics unsupported, skipping {:?} pulse", kind);
            return;
        }

        match device.impact(self.strength) {
            Ok(()) => trace!("Haptic pulse for {:?} ({:?})", kind, self.strength),
            Err(e) => debug!("Ignoring haptic failure for {:?}: {}", kind, e),
        }
    }
}

impl std::fmt::Debug for FeedbackEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackEmitter")
            .field("enabled", &self.device.is_some())
            .field("strength", &self.strength)
            .finish()
    }
}
