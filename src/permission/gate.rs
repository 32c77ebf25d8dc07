use crate::error::{PermissionError, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Camera authorization as seen by the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionState {
    Unknown,
    Denied,
    Granted,
}

impl PermissionState {
    pub fn is_granted(self) -> bool {
        self == PermissionState::Granted
    }

    fn from_granted(granted: bool) -> Self {
        if granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        }
    }
}

/// Platform camera-permission boundary
#[async_trait]
pub trait CameraAuthorizer: Send + Sync {
    /// Whether camera access is currently granted
    async fn is_granted(&self) -> std::result::Result<bool, PermissionError>;

    /// Show the platform prompt and wait for the user's answer
    async fn request_access(&self) -> std::result::Result<bool, PermissionError>;
}

/// Tracks camera authorization and drives the platform prompt.
///
/// The state only changes through [`PermissionGate::refresh`] and
/// [`PermissionGate::request`]. `Granted` is terminal.
pub struct PermissionGate {
    authorizer: Arc<dyn CameraAuthorizer>,
    state: RwLock<PermissionState>,
    request_lock: Mutex<()>,
}

impl PermissionGate {
    pub fn new(authorizer: Arc<dyn CameraAuthorizer>) -> Self {
        Self {
            authorizer,
            state: RwLock::new(PermissionState::Unknown),
            request_lock: Mutex::new(()),
        }
    }

    /// Current state without touching the platform
    pub fn query(&self) -> PermissionState {
        *self.state.read()
    }

    /// Resolve `Unknown` by asking the platform for the current status.
    ///
    /// A failed status query resolves to `Denied` so the user can still reach
    /// the request prompt instead of waiting on a loading screen forever.
    pub async fn refresh(&self) -> PermissionState {
        let _serial = self.request_lock.lock().await;

        if self.query().is_granted() {
            return PermissionState::Granted;
        }

        let resolved = match self.authorizer.is_granted().await {
            Ok(granted) => PermissionState::from_granted(granted),
            Err(e) => {
                warn!("Camera permission query failed, treating as denied: {}", e);
                PermissionState::Denied
            }
        };

        self.set_state(resolved);
        resolved
    }

    /// Prompt for camera access. Returns immediately when already granted.
    pub async fn request(&self) -> Result<PermissionState> {
        let _serial = self.request_lock.lock().await;

        if self.query().is_granted() {
            debug!("Camera permission already granted, skipping prompt");
            return Ok(PermissionState::Granted);
        }

        info!("Requesting camera permission");
        match self.authorizer.request_access().await {
            Ok(granted) => {
                let resolved = PermissionState::from_granted(granted);
                self.set_state(resolved);
                Ok(resolved)
            }
            Err(e) => {
                self.set_state(PermissionState::Denied);
                Err(e.into())
            }
        }
    }

    /// Fails unless the camera may be used
    pub fn ensure_granted(&self) -> Result<()> {
        match self.query() {
            PermissionState::Granted => Ok(()),
            PermissionState::Unknown => Err(PermissionError::Pending.into()),
            PermissionState::Denied => Err(PermissionError::Denied.into()),
        }
    }

    fn set_state(&self, next: PermissionState) {
        let mut state = self.state.write();
        if *state != next {
            info!("Camera permission {:?} -> {:?}", *state, next);
            *state = next;
        }
    }
}
