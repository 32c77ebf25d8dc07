use crate::camera::CapturedImageRef;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Route state for the analysis view
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisHandoffPayload {
    image_uri: String,
    timestamp: String,
}

impl AnalysisHandoffPayload {
    /// Derive the payload from a captured image: the URI is carried as-is
    /// (possibly empty) and the timestamp is the capture time in epoch millis.
    pub fn from_image(image: CapturedImageRef) -> Self {
        let (uri, captured_at) = image.into_parts();
        Self {
            image_uri: uri,
            timestamp: captured_at.to_string(),
        }
    }

    pub fn image_uri(&self) -> &str {
        &self.image_uri
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn into_parts(self) -> (String, String) {
        (self.image_uri, self.timestamp)
    }
}

/// Asynchronous diagnosis of one captured image
#[async_trait]
pub trait AnalysisJob: Send + Sync {
    async fn run(&self, image: CapturedImageRef) -> Result<AnalysisHandoffPayload, AnalysisError>;
}

/// Fixed-latency stand-in for the inference service
pub struct AnalysisJobSimulator {
    latency: Duration,
    failures: Mutex<VecDeque<String>>,
    runs: AtomicU32,
}

impl AnalysisJobSimulator {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            failures: Mutex::new(VecDeque::new()),
            runs: AtomicU32::new(0),
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.latency())
    }

    /// Make the next run fail after the usual latency
    pub fn then_fail(self, details: impl Into<String>) -> Self {
        self.failures.lock().push_back(details.into());
        self
    }

    pub fn run_count(&self) -> u32 {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

#[async_trait]
impl AnalysisJob for AnalysisJobSimulator {
    async fn run(&self, image: CapturedImageRef) -> Result<AnalysisHandoffPayload, AnalysisError> {
        let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Simulated diagnosis #{} of {} started", run, image.uri());

        sleep(self.latency).await;

        let failure = self.failures.lock().pop_front();
        if let Some(details) = failure {
            return Err(AnalysisError::Failed { details });
        }

        info!("Simulated diagnosis #{} finished after {:?}", run, self.latency);
        Ok(AnalysisHandoffPayload::from_image(image))
    }
}
