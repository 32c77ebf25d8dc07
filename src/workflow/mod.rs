mod builder;
mod orchestrator;
mod types;


pub use builder::ScanWorkflowBuilder;
pub use orchestrator::ScanWorkflow;
pub use types::{
    CycleOutcome, CycleRejection, ScreenView, UserAlert, ANALYSIS_OVERLAY_TEXT, LOADING_TEXT,
    PERMISSION_TEXT, PERMISSION_TITLE,
};
