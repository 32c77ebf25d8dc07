pub mod analysis;
pub mod camera;
pub mod capture;
pub mod config;
pub mod error;
pub mod events;
pub mod feedback;
pub mod handoff;
pub mod history;
pub mod keyboard_input;
pub mod permission;
pub mod workflow;

pub use analysis::{AnalysisHandoffPayload, AnalysisJob, AnalysisJobSimulator, AnalysisStage};
pub use camera::{CameraDevice, CapturedImageRef, FacingDirection, SimulatedCamera};
pub use capture::{CaptureController, CaptureSession, SessionTicket};
pub use config::ScanConfig;
pub use error::{Result, ScanError};
pub use events::{EventBus, EventFilter, EventReceiver, ScanEvent};
pub use feedback::{FeedbackEmitter, FeedbackKind, HapticDevice, ImpactStrength};
pub use handoff::{Navigator, ResultHandoff, RouteRequest};
pub use history::{sample_history, AnalysisRecord, HistorySource, Severity, StaticHistory, TreatmentStatus};
pub use keyboard_input::{KeyboardInputHandler, ScanCommand};
pub use permission::{CameraAuthorizer, PermissionGate, PermissionState, SimulatedAuthorizer};
pub use workflow::{CycleOutcome, CycleRejection, ScanWorkflow, ScanWorkflowBuilder, ScreenView, UserAlert};
