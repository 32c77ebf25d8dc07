use crate::analysis::AnalysisHandoffPayload;
use crate::capture::SessionTicket;
use crate::error::{NavigationError, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Route name of the downstream analysis view
pub const ANALYSIS_ROUTE: &str = "analysis";

/// A navigation request with string route parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub pathname: String,
    pub params: BTreeMap<String, String>,
}

impl RouteRequest {
    /// Route into the analysis view carrying `payload`
    pub fn analysis(payload: AnalysisHandoffPayload) -> Self {
        let (image_uri, timestamp) = payload.into_parts();
        let mut params = BTreeMap::new();
        params.insert("imageUri".to_string(), image_uri);
        params.insert("timestamp".to_string(), timestamp);

        Self {
            pathname: ANALYSIS_ROUTE.to_string(),
            params,
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Screen navigation boundary
pub trait Navigator: Send + Sync {
    fn push(&self, route: RouteRequest) -> std::result::Result<(), NavigationError>;
}

impl<F> Navigator for F
where
    F: Fn(RouteRequest) -> std::result::Result<(), NavigationError> + Send + Sync,
{
    fn push(&self, route: RouteRequest) -> std::result::Result<(), NavigationError> {
        self(route)
    }
}

/// What happened to a finished diagnosis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffOutcome {
    Delivered(RouteRequest),
    /// The owning session was left before the result arrived
    Suppressed,
}

/// Moves a finished diagnosis to the analysis view
#[derive(Clone)]
pub struct ResultHandoff {
    navigator: Arc<dyn Navigator>,
}

impl ResultHandoff {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self { navigator }
    }

    /// Navigate to the analysis view with `payload` as route state
    pub fn handoff(&self, payload: AnalysisHandoffPayload) -> Result<RouteRequest> {
        let route = RouteRequest::analysis(payload);
        self.navigator.push(route.clone())?;
        info!(
            "Handed off {} to '{}'",
            route.param("imageUri").unwrap_or_default(),
            route.pathname
        );
        Ok(route)
    }

    /// Hand off only while the session behind `ticket` is still on screen.
    /// A stale ticket drops the payload without navigating.
    pub fn handoff_if_current(
        &self,
        ticket: &SessionTicket,
        payload: AnalysisHandoffPayload,
    ) -> Result<HandoffOutcome> {
        if !ticket.is_current() {
            debug!(
                "Session {} left before diagnosis finished, dropping result",
                ticket.session_id()
            );
            return Ok(HandoffOutcome::Suppressed);
        }

        self.handoff(payload).map(HandoffOutcome::Delivered)
    }
}

/// Navigator that records pushed routes
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<RouteRequest>>,
    reject_with: Mutex<Option<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every later push with `details`
    pub fn reject(&self, details: impl Into<String>) {
        *self.reject_with.lock() = Some(details.into());
    }

    pub fn routes(&self) -> Vec<RouteRequest> {
        self.routes.lock().clone()
    }

    pub fn push_count(&self) -> usize {
        self.routes.lock().len()
    }
}

impl Navigator for RecordingNavigator {
    fn push(&self, route: RouteRequest) -> std::result::Result<(), NavigationError> {
        if let Some(details) = self.reject_with.lock().clone() {
            return Err(NavigationError::Rejected {
                route: route.pathname,
                details,
            });
        }
        self.routes.lock().push(route);
        Ok(())
    }
}
