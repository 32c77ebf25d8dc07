use std::time::Duration;
use thiserror::Error;

/// Title shown on every workflow alert
pub const ALERT_TITLE: &str = "Erreur";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Permission error: {0}")]
    Permission(#[from] PermissionError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    #[error("System error: {message}")]
    System { message: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    #[error("Camera permission has not been resolved yet")]
    Pending,

    #[error("Camera permission denied")]
    Denied,

    #[error("Platform permission call failed: {details}")]
    Platform { details: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("A capture is already in progress")]
    Busy,

    #[error("Camera is not available: {details}")]
    Unavailable { details: String },

    #[error("Hardware capture failed: {details}")]
    Hardware { details: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Diagnosis failed: {details}")]
    Failed { details: String },

    #[error("Diagnosis timed out after {after:?}")]
    Timeout { after: Duration },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventBusError {
    #[error("Event bus channel closed")]
    ChannelClosed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HapticError {
    #[error("Haptic engine unavailable")]
    Unavailable,

    #[error("Haptic impulse failed: {details}")]
    Impulse { details: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Route '{route}' rejected: {details}")]
    Rejected { route: String, details: String },
}

impl ScanError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    /// Whether the user can retry from the same screen after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ScanError::Permission(_)
                | ScanError::Capture(_)
                | ScanError::Analysis(_)
                | ScanError::Navigation(_)
        )
    }

    /// Message body for the blocking alert raised when this error reaches the screen
    pub fn user_message(&self) -> &'static str {
        match self {
            ScanError::Permission(_) => "Nous avons besoin d'accéder à votre caméra",
            ScanError::Capture(_) => "Impossible de prendre la photo",
            ScanError::Analysis(AnalysisError::Timeout { .. }) => "L'analyse a pris trop de temps",
            ScanError::Analysis(_) => "Impossible d'analyser la photo",
            ScanError::Navigation(_) => "Impossible d'afficher le résultat",
            _ => "Une erreur inattendue est survenue",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
