use crate::camera::FacingDirection;
use crate::error::{ScanError, ALERT_TITLE};
use crate::handoff::RouteRequest;
use serde::Serialize;

pub const LOADING_TEXT: &str = "Chargement de la caméra...";
pub const PERMISSION_TITLE: &str = "Accès à la caméra requis";
pub const PERMISSION_TEXT: &str =
    "Nous avons besoin d'accéder à votre caméra pour analyser vos plantes";
pub const ANALYSIS_OVERLAY_TEXT: &str = "Analyse en cours...";

/// Blocking alert that must be acknowledged before the camera is usable again
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAlert {
    pub title: String,
    pub message: String,
}

impl UserAlert {
    pub fn from_error(error: &ScanError) -> Self {
        Self {
            title: ALERT_TITLE.to_string(),
            message: error.user_message().to_string(),
        }
    }
}

/// What the camera screen should render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ScreenView {
    /// No session is active
    Inactive,
    /// Permission not yet resolved; camera operations are blocked
    Loading,
    /// Permission denied; only the request prompt is reachable. A failed
    /// prompt leaves its alert here until acknowledged.
    PermissionRequired { alert: Option<UserAlert> },
    Camera {
        facing: FacingDirection,
        capturing: bool,
        alert: Option<UserAlert>,
    },
}

impl ScreenView {
    /// Text the presentation layer shows for this state, if any
    pub fn caption(&self) -> Option<&'static str> {
        match self {
            ScreenView::Inactive => None,
            ScreenView::Loading => Some(LOADING_TEXT),
            ScreenView::PermissionRequired { .. } => Some(PERMISSION_TITLE),
            ScreenView::Camera { capturing: true, .. } => Some(ANALYSIS_OVERLAY_TEXT),
            ScreenView::Camera { .. } => None,
        }
    }

    /// Alert currently on screen, whichever state shows it
    pub fn alert(&self) -> Option<&UserAlert> {
        match self {
            ScreenView::PermissionRequired { alert } | ScreenView::Camera { alert, .. } => {
                alert.as_ref()
            }
            _ => None,
        }
    }

    pub fn is_camera(&self) -> bool {
        matches!(self, ScreenView::Camera { .. })
    }
}

/// Why a capture request was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleRejection {
    Inactive,
    PermissionRequired,
    Busy,
    AlertPending,
}

/// Result of one capture-to-diagnosis attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The analysis view was opened with this route
    Delivered(RouteRequest),
    /// Nothing happened
    Rejected(CycleRejection),
    /// The cycle failed and this alert is now on screen
    Failed(UserAlert),
    /// The screen was left before the cycle finished
    Abandoned,
}

impl CycleOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, CycleOutcome::Delivered(_))
    }
}
