use super::gate::CameraAuthorizer;
use crate::error::PermissionError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// In-process stand-in for the platform permission prompt
pub struct SimulatedAuthorizer {
    granted: AtomicBool,
    grant_on_request: bool,
    query_fails: bool,
    request_fails: bool,
    platform_delay: Duration,
    queries: AtomicU32,
    requests: AtomicU32,
}

impl SimulatedAuthorizer {
    pub fn new(initially_granted: bool, grant_on_request: bool) -> Self {
        Self {
            granted: AtomicBool::new(initially_granted),
            grant_on_request,
            query_fails: false,
            request_fails: false,
            platform_delay: Duration::ZERO,
            queries: AtomicU32::new(0),
            requests: AtomicU32::new(0),
        }
    }

    pub fn granted() -> Self {
        Self::new(true, true)
    }

    /// Not yet granted, and the user accepts the prompt
    pub fn grants_on_request() -> Self {
        Self::new(false, true)
    }

    /// Not granted, and the user refuses every prompt
    pub fn always_denies() -> Self {
        Self::new(false, false)
    }

    pub fn with_failing_query(mut self) -> Self {
        self.query_fails = true;
        self
    }

    /// The prompt itself errors at the platform
    pub fn with_failing_request(mut self) -> Self {
        self.request_fails = true;
        self
    }

    /// Delay applied to every platform call
    pub fn with_platform_delay(mut self, delay: Duration) -> Self {
        self.platform_delay = delay;
        self
    }

    pub fn query_count(&self) -> u32 {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn request_count(&self) -> u32 {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraAuthorizer for SimulatedAuthorizer {
    async fn is_granted(&self) -> Result<bool, PermissionError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if !self.platform_delay.is_zero() {
            sleep(self.platform_delay).await;
        }
        if self.query_fails {
            return Err(PermissionError::Platform {
                details: "permission service unreachable".to_string(),
            });
        }
        Ok(self.granted.load(Ordering::SeqCst))
    }

    async fn request_access(&self) -> Result<bool, PermissionError> {
        let attempt = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.platform_delay.is_zero() {
            sleep(self.platform_delay).await;
        }
        if self.request_fails {
            return Err(PermissionError::Platform {
                details: "permission prompt could not be shown".to_string(),
            });
        }
        if self.grant_on_request {
            self.granted.store(true, Ordering::SeqCst);
        }
        let granted = self.granted.load(Ordering::SeqCst);
        debug!("Simulated permission prompt #{} answered: {}", attempt, granted);
        Ok(granted)
    }
}
