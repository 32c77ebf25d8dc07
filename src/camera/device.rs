use crate::error::CaptureError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Which physical sensor is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacingDirection {
    Front,
    Back,
}

impl FacingDirection {
    pub fn flipped(self) -> Self {
        match self {
            FacingDirection::Front => FacingDirection::Back,
            FacingDirection::Back => FacingDirection::Front,
        }
    }
}

/// Reference to a photo produced by the camera hardware
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct CapturedImageRef {
    uri: String,
    captured_at_epoch_millis: i64,
}

impl CapturedImageRef {
    pub fn new(uri: impl Into<String>, captured_at_epoch_millis: i64) -> Self {
        Self {
            uri: uri.into(),
            captured_at_epoch_millis,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn captured_at_epoch_millis(&self) -> i64 {
        self.captured_at_epoch_millis
    }

    pub fn into_parts(self) -> (String, i64) {
        (self.uri, self.captured_at_epoch_millis)
    }
}

/// Camera hardware boundary.
///
/// A device is owned by exactly one active screen at a time.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Take a still photo with the given sensor. `quality` is a JPEG quality
    /// factor in (0, 1].
    async fn take_photo(
        &self,
        facing: FacingDirection,
        quality: f32,
    ) -> Result<CapturedImageRef, CaptureError>;
}
