use crate::camera::FacingDirection;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

/// Per-screen capture state.
///
/// Created when the camera screen is activated and closed when the user
/// navigates away. `capturing` is the only lock on the capture pipeline: it is
/// held by a [`CaptureGuard`] from capture start until the cycle ends.
#[derive(Debug)]
pub struct CaptureSession {
    id: Uuid,
    facing: Mutex<FacingDirection>,
    capturing: AtomicBool,
    token: CancellationToken,
}

impl CaptureSession {
    pub fn new(facing: FacingDirection) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            facing: Mutex::new(facing),
            capturing: AtomicBool::new(false),
            token: CancellationToken::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn facing(&self) -> FacingDirection {
        *self.facing.lock()
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    /// False once the owning screen has been left
    pub fn is_current(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn ticket(&self) -> SessionTicket {
        SessionTicket {
            session_id: self.id,
            token: self.token.clone(),
        }
    }

    /// Mark the session defunct; outstanding tickets stop being current
    pub(crate) fn close(&self) {
        if !self.token.is_cancelled() {
            debug!("Closing capture session {}", self.id);
            self.token.cancel();
        }
    }

    /// Flip the sensor unless a capture is in flight
    pub(crate) fn toggle_facing(&self) -> Option<FacingDirection> {
        let mut facing = self.facing.lock();
        if self.is_capturing() {
            return None;
        }
        *facing = facing.flipped();
        Some(*facing)
    }

    /// Claim the busy flag. `None` if a capture is already in flight.
    pub(crate) fn try_begin_capture(self: &Arc<Self>) -> Option<CaptureGuard> {
        // Facing lock orders this against toggle_facing
        let facing = self.facing.lock();
        self.capturing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        debug!("Session {} busy", self.id);
        Some(CaptureGuard {
            session: Arc::clone(self),
            facing: *facing,
        })
    }
}

/// Holds the session busy flag; dropping it clears the flag.
///
/// Every exit path of a capture cycle (success, error, or the future being
/// dropped) releases the flag exactly once.
#[derive(Debug)]
pub struct CaptureGuard {
    session: Arc<CaptureSession>,
    facing: FacingDirection,
}

impl CaptureGuard {
    /// Sensor selected when the capture started
    pub fn facing(&self) -> FacingDirection {
        self.facing
    }

    pub fn session_id(&self) -> Uuid {
        self.session.id
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.session.capturing.store(false, Ordering::SeqCst);
        debug!("Session {} idle", self.session.id);
    }
}

/// Proof of which session started a cycle, checked before handing off a result
#[derive(Debug, Clone)]
pub struct SessionTicket {
    session_id: Uuid,
    token: CancellationToken,
}

impl SessionTicket {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn is_current(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Resolves once the owning session is closed
    pub async fn abandoned(&self) {
        self.token.cancelled().await
    }
}
