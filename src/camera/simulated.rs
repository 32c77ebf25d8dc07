use super::device::{CameraDevice, CapturedImageRef, FacingDirection};
use crate::config::CameraConfig;
use crate::error::CaptureError;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

enum ScriptedShot {
    Image { uri: String, captured_at: i64 },
    Fail(String),
}

/// Camera stand-in that fabricates image URIs.
///
/// Scripted outcomes are consumed first, in order; once the script is empty
/// every shot succeeds with `<output_dir>/scan_<millis>.jpg`.
pub struct SimulatedCamera {
    output_dir: String,
    latency: Duration,
    script: Mutex<VecDeque<ScriptedShot>>,
    shots: AtomicU32,
    last_request: Mutex<Option<(FacingDirection, f32)>>,
}

impl SimulatedCamera {
    pub fn new(output_dir: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            latency: Duration::ZERO,
            script: Mutex::new(VecDeque::new()),
            shots: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.output_dir.clone())
            .with_latency(Duration::from_millis(config.simulated_latency_ms))
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue a successful shot with a fixed URI and timestamp
    pub fn then_return(self, uri: impl Into<String>, captured_at_epoch_millis: i64) -> Self {
        self.script.lock().push_back(ScriptedShot::Image {
            uri: uri.into(),
            captured_at: captured_at_epoch_millis,
        });
        self
    }

    /// Queue a hardware failure
    pub fn then_fail(self, details: impl Into<String>) -> Self {
        self.script
            .lock()
            .push_back(ScriptedShot::Fail(details.into()));
        self
    }

    pub fn shot_count(&self) -> u32 {
        self.shots.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(FacingDirection, f32)> {
        *self.last_request.lock()
    }
}

#[async_trait]
impl CameraDevice for SimulatedCamera {
    async fn take_photo(
        &self,
        facing: FacingDirection,
        quality: f32,
    ) -> Result<CapturedImageRef, CaptureError> {
        let shot = self.shots.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_request.lock() = Some((facing, quality));
        debug!(
            "Simulated shot #{} ({:?}, quality {:.2})",
            shot, facing, quality
        );

        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }

        let scripted = self.script.lock().pop_front();
        match scripted {
            Some(ScriptedShot::Image { uri, captured_at }) => {
                Ok(CapturedImageRef::new(uri, captured_at))
            }
            Some(ScriptedShot::Fail(details)) => Err(CaptureError::Hardware { details }),
            None => {
                let captured_at = Utc::now().timestamp_millis();
                let uri = format!(
                    "{}/scan_{}.jpg",
                    self.output_dir.trim_end_matches('/'),
                    captured_at
                );
                Ok(CapturedImageRef::new(uri, captured_at))
            }
        }
    }
}
