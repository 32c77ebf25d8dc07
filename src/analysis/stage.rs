use super::job::{AnalysisHandoffPayload, AnalysisJob};
use crate::camera::CapturedImageRef;
use crate::error::{AnalysisError, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

/// Runs an [`AnalysisJob`] under an optional deadline
#[derive(Clone)]
pub struct AnalysisStage {
    job: Arc<dyn AnalysisJob>,
    timeout: Option<Duration>,
}

impl AnalysisStage {
    pub fn new(job: Arc<dyn AnalysisJob>, timeout: Option<Duration>) -> Self {
        Self { job, timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Diagnose `image`. Consumes it, so a capture can be analysed only once.
    pub async fn run(&self, image: CapturedImageRef) -> Result<AnalysisHandoffPayload> {
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, self.job.run(image)).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!("Diagnosis exceeded {:?}, giving up", limit);
                    Err(AnalysisError::Timeout { after: limit })
                }
            },
            None => self.job.run(image).await,
        };

        outcome.map_err(|e| {
            error!("Diagnosis failed: {}", e);
            e.into()
        })
    }
}
