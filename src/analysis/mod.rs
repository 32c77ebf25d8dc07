//! Diagnosis step run between a successful capture and the result hand-off.
//!
//! [`AnalysisJob`] is the seam for the inference service. The shipped
//! [`AnalysisJobSimulator`] waits a fixed latency and echoes the image back as
//! the payload; [`AnalysisStage`] wraps any job with the configured timeout.

mod job;
mod stage;
#[cfg(test)]
mod tests;

pub use job::{AnalysisHandoffPayload, AnalysisJob, AnalysisJobSimulator};
pub use stage::AnalysisStage;
