use super::types::{CycleOutcome, CycleRejection, ScreenView, UserAlert};
use crate::analysis::AnalysisStage;
use crate::camera::{CameraDevice, FacingDirection};
use crate::capture::{CaptureController, SessionTicket};
use crate::config::ScanConfig;
use crate::error::{CaptureError, ScanError};
use crate::events::{EventBus, ScanEvent};
use crate::feedback::{FeedbackEmitter, FeedbackKind};
use crate::handoff::{HandoffOutcome, ResultHandoff};
use crate::permission::{PermissionGate, PermissionState};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// One camera screen: permission gate, capture session, diagnosis and
/// hand-off chained into a single sequential cycle.
///
/// No operation returns an error. Failures become a [`UserAlert`] on the
/// screen, and results that arrive after the screen was left are dropped.
pub struct ScanWorkflow {
    pub(super) config: ScanConfig,
    pub(super) camera: Arc<dyn CameraDevice>,
    pub(super) permission: Arc<PermissionGate>,
    pub(super) feedback: FeedbackEmitter,
    pub(super) analysis: AnalysisStage,
    pub(super) handoff: ResultHandoff,
    pub(super) event_bus: Arc<EventBus>,
    pub(super) controller: RwLock<Option<Arc<CaptureController>>>,
    pub(super) alert: Mutex<Option<UserAlert>>,
}

impl ScanWorkflow {
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    /// Open a fresh capture session and resolve the camera permission.
    /// A session that was still open is closed first.
    pub async fn activate(&self) -> ScreenView {
        let controller = Arc::new(
            CaptureController::new(
                Arc::clone(&self.camera),
                Arc::clone(&self.permission),
                self.feedback.clone(),
                &self.config.camera,
            )
            .with_event_bus(Arc::clone(&self.event_bus)),
        );
        let session_id = controller.session().id();

        if let Some(previous) = self.controller.write().replace(controller) {
            previous.close();
        }
        self.alert.lock().take();

        info!("Scan screen activated (session {})", session_id);
        self.event_bus.emit(ScanEvent::SessionActivated {
            session_id: session_id.to_string(),
        });

        let state = self.permission.refresh().await;
        self.event_bus.emit(ScanEvent::PermissionChanged { state });

        self.view()
    }

    /// Leave the screen. Any cycle still in flight finishes without handing off.
    pub fn deactivate(&self) {
        let Some(controller) = self.controller.write().take() else {
            return;
        };
        controller.close();
        self.alert.lock().take();

        let session_id = controller.session().id();
        if controller.is_capturing() {
            info!(
                "Scan screen left during capture; session {} abandoned",
                session_id
            );
        } else {
            info!("Scan screen deactivated (session {})", session_id);
        }
        self.event_bus.emit(ScanEvent::SessionDeactivated {
            session_id: session_id.to_string(),
        });
    }

    /// Back button: haptic pulse, then leave the screen
    pub fn go_back(&self) {
        self.feedback.emit(FeedbackKind::Back);
        self.deactivate();
    }

    pub fn view(&self) -> ScreenView {
        let Some(controller) = self.active_controller() else {
            return ScreenView::Inactive;
        };

        match self.permission.query() {
            PermissionState::Unknown => ScreenView::Loading,
            PermissionState::Denied => ScreenView::PermissionRequired {
                alert: self.alert.lock().clone(),
            },
            PermissionState::Granted => ScreenView::Camera {
                facing: controller.facing(),
                capturing: controller.is_capturing(),
                alert: self.alert.lock().clone(),
            },
        }
    }

    pub fn permission_state(&self) -> PermissionState {
        self.permission.query()
    }

    pub fn is_capturing(&self) -> bool {
        self.active_controller()
            .map(|controller| controller.is_capturing())
            .unwrap_or(false)
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.active_controller()
            .map(|controller| controller.session().id())
    }

    pub fn pending_alert(&self) -> Option<UserAlert> {
        self.alert.lock().clone()
    }

    /// Dismiss the alert on screen, if any
    pub fn acknowledge_alert(&self) -> Option<UserAlert> {
        let alert = self.alert.lock().take();
        if alert.is_some() {
            debug!("Alert acknowledged");
            self.event_bus.emit(ScanEvent::AlertAcknowledged);
        }
        alert
    }

    /// Show the platform prompt. Idempotent once granted.
    pub async fn request_permission(&self) -> PermissionState {
        let before = self.permission.query();
        match self.permission.request().await {
            Ok(state) => {
                if state != before {
                    self.event_bus.emit(ScanEvent::PermissionChanged { state });
                }
                state
            }
            Err(e) => {
                warn!("Camera permission request failed: {}", e);
                self.raise_alert(&e);
                self.permission.query()
            }
        }
    }

    /// Switch sensors. Ignored while busy, without permission, or while an
    /// alert is on screen.
    pub fn toggle_facing(&self) -> Option<FacingDirection> {
        if self.alert.lock().is_some() {
            debug!("Ignoring facing toggle while an alert is shown");
            return None;
        }
        self.active_controller()?.toggle_facing()
    }

    /// Capture a photo, diagnose it and hand the result to the analysis view.
    ///
    /// The session stays busy from capture start until the hand-off (or the
    /// failure) so no second capture, toggle or hand-off can interleave. A
    /// failure raises its alert before the session is released, and the
    /// pending-alert check runs with the session held.
    pub async fn capture_and_diagnose(&self) -> CycleOutcome {
        let Some(controller) = self.active_controller() else {
            return CycleOutcome::Rejected(CycleRejection::Inactive);
        };

        let ticket = controller.ticket();
        let guard = match controller.begin_capture() {
            Ok(guard) => guard,
            Err(ScanError::Capture(CaptureError::Busy)) => {
                return CycleOutcome::Rejected(CycleRejection::Busy);
            }
            Err(e) => return self.fail_cycle(&ticket, e),
        };
        if self.alert.lock().is_some() {
            debug!("Ignoring capture while an alert is shown");
            return CycleOutcome::Rejected(CycleRejection::AlertPending);
        }

        let image = match controller.take_photo(&guard).await {
            Ok(image) => image,
            Err(ScanError::Permission(_)) => {
                return CycleOutcome::Rejected(CycleRejection::PermissionRequired);
            }
            Err(e) => return self.fail_cycle(&ticket, e),
        };
        // The guard keeps the session busy even if the screen drops its handle
        drop(controller);

        let image_uri = image.uri().to_string();
        let analysis = tokio::select! {
            outcome = self.analysis.run(image) => outcome,
            _ = ticket.abandoned() => {
                info!("Diagnosis abandoned: session {} was left", ticket.session_id());
                return self.suppress(&ticket);
            }
        };
        let payload = match analysis {
            Ok(payload) => payload,
            Err(e) => {
                self.event_bus.emit(ScanEvent::AnalysisFailed {
                    error: e.to_string(),
                });
                return self.fail_cycle(&ticket, e);
            }
        };
        self.event_bus.emit(ScanEvent::AnalysisCompleted { image_uri });

        let outcome = match self.handoff.handoff_if_current(&ticket, payload) {
            Ok(HandoffOutcome::Delivered(route)) => {
                self.event_bus.emit(ScanEvent::HandoffDelivered {
                    image_uri: route.param("imageUri").unwrap_or_default().to_string(),
                    timestamp: route.param("timestamp").unwrap_or_default().to_string(),
                });
                CycleOutcome::Delivered(route)
            }
            Ok(HandoffOutcome::Suppressed) => self.suppress(&ticket),
            Err(e) => self.fail_cycle(&ticket, e),
        };

        drop(guard);
        outcome
    }

    /// Run a cycle on its own task so the caller can keep driving the screen
    pub fn spawn_cycle(self: &Arc<Self>) -> JoinHandle<CycleOutcome> {
        let workflow = Arc::clone(self);
        tokio::spawn(async move { workflow.capture_and_diagnose().await })
    }

    fn active_controller(&self) -> Option<Arc<CaptureController>> {
        self.controller.read().clone()
    }

    /// Surface a cycle failure, unless the owning screen is already gone
    fn fail_cycle(&self, ticket: &SessionTicket, error: ScanError) -> CycleOutcome {
        if !ticket.is_current() {
            debug!(
                "Dropping failure for left session {}: {}",
                ticket.session_id(),
                error
            );
            return CycleOutcome::Abandoned;
        }
        CycleOutcome::Failed(self.raise_alert(&error))
    }

    fn suppress(&self, ticket: &SessionTicket) -> CycleOutcome {
        self.event_bus.emit(ScanEvent::HandoffSuppressed {
            session_id: ticket.session_id().to_string(),
        });
        CycleOutcome::Abandoned
    }

    fn raise_alert(&self, error: &ScanError) -> UserAlert {
        let alert = UserAlert::from_error(error);
        if error.is_recoverable() {
            info!("Alert raised: {} - {}", alert.title, alert.message);
        } else {
            error!("Alert raised for unexpected failure: {}", error);
        }
        *self.alert.lock() = Some(alert.clone());
        self.event_bus.emit(ScanEvent::AlertRaised {
            title: alert.title.clone(),
            message: alert.message.clone(),
        });
        alert
    }
}
