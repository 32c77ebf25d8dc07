use super::session::{CaptureGuard, CaptureSession, SessionTicket};
use crate::camera::{CameraDevice, CapturedImageRef, FacingDirection};
use crate::config::CameraConfig;
use crate::error::{CaptureError, Result};
use crate::events::{EventBus, ScanEvent};
use crate::feedback::{FeedbackEmitter, FeedbackKind};
use crate::permission::PermissionGate;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Owns the camera for one active screen and enforces single-capture
/// exclusivity over its [`CaptureSession`].
pub struct CaptureController {
    camera: Arc<dyn CameraDevice>,
    permission: Arc<PermissionGate>,
    feedback: FeedbackEmitter,
    quality: f32,
    session: Arc<CaptureSession>,
    event_bus: Option<Arc<EventBus>>,
}

impl CaptureController {
    pub fn new(
        camera: Arc<dyn CameraDevice>,
        permission: Arc<PermissionGate>,
        feedback: FeedbackEmitter,
        config: &CameraConfig,
    ) -> Self {
        let session = CaptureSession::new(config.default_facing);
        info!(
            "Capture session {} opened ({:?} camera)",
            session.id(),
            config.default_facing
        );

        Self {
            camera,
            permission,
            feedback,
            quality: config.quality,
            session,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn session(&self) -> &Arc<CaptureSession> {
        &self.session
    }

    pub fn ticket(&self) -> SessionTicket {
        self.session.ticket()
    }

    pub fn facing(&self) -> FacingDirection {
        self.session.facing()
    }

    pub fn is_capturing(&self) -> bool {
        self.session.is_capturing()
    }

    /// Switch sensors. Returns `None` without feedback when the camera is
    /// locked (permission missing or a capture in flight).
    pub fn toggle_facing(&self) -> Option<FacingDirection> {
        if !self.permission.query().is_granted() {
            debug!("Ignoring facing toggle without camera permission");
            return None;
        }

        let Some(facing) = self.session.toggle_facing() else {
            debug!("Ignoring facing toggle while capturing");
            return None;
        };

        self.feedback.emit(FeedbackKind::ToggleFacing);
        self.emit(ScanEvent::FacingToggled { facing });
        debug!("Camera facing now {:?}", facing);
        Some(facing)
    }

    /// Claim the session for one capture cycle.
    ///
    /// Rejected with [`CaptureError::Busy`] while another cycle holds the
    /// session, whatever the permission state. The busy flag stays set until
    /// the returned guard is dropped.
    pub fn begin_capture(&self) -> Result<CaptureGuard> {
        let guard = self.session.try_begin_capture().ok_or_else(|| {
            debug!("Capture rejected: session {} busy", self.session.id());
            CaptureError::Busy
        })?;

        if !self.session.is_current() {
            return Err(CaptureError::Unavailable {
                details: "camera screen is no longer active".to_string(),
            }
            .into());
        }

        Ok(guard)
    }

    /// Take one photo under `guard`. Hardware failures are returned once;
    /// nothing is retried.
    pub async fn take_photo(&self, guard: &CaptureGuard) -> Result<CapturedImageRef> {
        if guard.session_id() != self.session.id() {
            return Err(CaptureError::Unavailable {
                details: "guard belongs to another session".to_string(),
            }
            .into());
        }

        self.permission.ensure_granted()?;

        self.feedback.emit(FeedbackKind::CaptureStart);
        self.emit(ScanEvent::CaptureStarted {
            session_id: self.session.id().to_string(),
        });
        info!(
            "Capturing photo ({:?} camera, quality {:.2})",
            guard.facing(),
            self.quality
        );

        match self.camera.take_photo(guard.facing(), self.quality).await {
            Ok(image) => {
                info!("Photo captured: {}", image.uri());
                self.emit(ScanEvent::CaptureCompleted {
                    uri: image.uri().to_string(),
                });
                Ok(image)
            }
            Err(e) => {
                error!("Photo capture failed: {}", e);
                self.emit(ScanEvent::CaptureFailed {
                    error: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// Release the camera; in-flight cycles will no longer hand off
    pub fn close(&self) {
        self.session.close();
    }

    fn emit(&self, event: ScanEvent) {
        if let Some(event_bus) = &self.event_bus {
            event_bus.emit(event);
        }
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        self.session.close();
    }
}
