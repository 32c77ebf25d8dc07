use crate::camera::FacingDirection;
use crate::error::EventBusError;
use crate::permission::PermissionState;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Events emitted by the scan workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScanEvent {
    /// The camera screen became active with a fresh session
    SessionActivated { session_id: String },
    /// The camera screen was left
    SessionDeactivated { session_id: String },
    /// Camera authorization changed
    PermissionChanged { state: PermissionState },
    /// The active sensor was switched
    FacingToggled { facing: FacingDirection },
    /// A capture claimed the session
    CaptureStarted { session_id: String },
    /// The camera returned a photo
    CaptureCompleted { uri: String },
    /// The camera failed to take a photo
    CaptureFailed { error: String },
    /// A diagnosis produced its payload
    AnalysisCompleted { image_uri: String },
    /// A diagnosis failed or timed out
    AnalysisFailed { error: String },
    /// The analysis view was opened with a result
    HandoffDelivered { image_uri: String, timestamp: String },
    /// A result arrived for a session that was already left
    HandoffSuppressed { session_id: String },
    /// A blocking alert is on screen
    AlertRaised { title: String, message: String },
    /// The user dismissed the alert
    AlertAcknowledged,
}

impl ScanEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            ScanEvent::SessionActivated { session_id } => {
                format!("Session {} activated", session_id)
            }
            ScanEvent::SessionDeactivated { session_id } => {
                format!("Session {} deactivated", session_id)
            }
            ScanEvent::PermissionChanged { state } => format!("Camera permission {:?}", state),
            ScanEvent::FacingToggled { facing } => format!("Camera facing {:?}", facing),
            ScanEvent::CaptureStarted { session_id } => {
                format!("Capture started in session {}", session_id)
            }
            ScanEvent::CaptureCompleted { uri } => format!("Photo captured: {}", uri),
            ScanEvent::CaptureFailed { error } => format!("Capture failed: {}", error),
            ScanEvent::AnalysisCompleted { image_uri } => {
                format!("Analysis completed for {}", image_uri)
            }
            ScanEvent::AnalysisFailed { error } => format!("Analysis failed: {}", error),
            ScanEvent::HandoffDelivered {
                image_uri,
                timestamp,
            } => format!("Result handed off: {} @ {}", image_uri, timestamp),
            ScanEvent::HandoffSuppressed { session_id } => {
                format!("Result dropped for left session {}", session_id)
            }
            ScanEvent::AlertRaised { title, message } => format!("{}: {}", title, message),
            ScanEvent::AlertAcknowledged => "Alert acknowledged".to_string(),
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            ScanEvent::SessionActivated { .. } => "session_activated",
            ScanEvent::SessionDeactivated { .. } => "session_deactivated",
            ScanEvent::PermissionChanged { .. } => "permission_changed",
            ScanEvent::FacingToggled { .. } => "facing_toggled",
            ScanEvent::CaptureStarted { .. } => "capture_started",
            ScanEvent::CaptureCompleted { .. } => "capture_completed",
            ScanEvent::CaptureFailed { .. } => "capture_failed",
            ScanEvent::AnalysisCompleted { .. } => "analysis_completed",
            ScanEvent::AnalysisFailed { .. } => "analysis_failed",
            ScanEvent::HandoffDelivered { .. } => "handoff_delivered",
            ScanEvent::HandoffSuppressed { .. } => "handoff_suppressed",
            ScanEvent::AlertRaised { .. } => "alert_raised",
            ScanEvent::AlertAcknowledged => "alert_acknowledged",
        }
    }
}

/// Broadcast bus the workflow reports its lifecycle on.
///
/// Publishing is fire-and-forget: an event nobody subscribed to is dropped.
pub struct EventBus {
    sender: broadcast::Sender<ScanEvent>,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.sender.subscribe()
    }

    /// Log the event at its severity and hand it to every subscriber
    pub fn emit(&self, event: ScanEvent) {
        match &event {
            ScanEvent::CaptureFailed { error: e } | ScanEvent::AnalysisFailed { error: e } => {
                warn!("Scan cycle error: {}", e);
            }
            ScanEvent::HandoffSuppressed { session_id } => {
                warn!("Dropped result for left session {}", session_id);
            }
            ScanEvent::HandoffDelivered { image_uri, .. } => {
                info!("Result handed off for {}", image_uri);
            }
            _ => debug!("Event: {}", event.description()),
        }

        // Only fails when nobody is subscribed
        let _ = self.sender.send(event);
    }
}

/// Event filter for selective event handling
#[derive(Debug, Clone)]
pub enum EventFilter {
    /// Accept all events
    All,
    /// Accept only specific event types
    EventTypes(Vec<&'static str>),
}

impl EventFilter {
    pub fn matches(&self, event: &ScanEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::EventTypes(types) => types.contains(&event.event_type()),
        }
    }
}

/// Event receiver with filtering
pub struct EventReceiver {
    receiver: broadcast::Receiver<ScanEvent>,
    filter: EventFilter,
    name: String,
}

impl EventReceiver {
    pub fn new(receiver: broadcast::Receiver<ScanEvent>, filter: EventFilter, name: String) -> Self {
        Self {
            receiver,
            filter,
            name,
        }
    }

    /// Receive the next event that passes the filter. Lagging skips ahead.
    pub async fn recv(&mut self) -> Result<ScanEvent, EventBusError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        return Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Event bus closed for receiver '{}'", self.name);
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_emit_reaches_every_subscriber() {
        let event_bus = EventBus::new(10);
        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();

        event_bus.emit(ScanEvent::FacingToggled {
            facing: FacingDirection::Front,
        });

        for receiver in [&mut receiver1, &mut receiver2] {
            let event = timeout(Duration::from_millis(100), receiver.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(
                event,
                ScanEvent::FacingToggled {
                    facing: FacingDirection::Front
                }
            );
        }
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_is_dropped() {
        let event_bus = EventBus::new(10);

        event_bus.emit(ScanEvent::AlertAcknowledged);

        // A late subscriber does not see earlier events
        let mut receiver = event_bus.subscribe();
        event_bus.emit(ScanEvent::CaptureCompleted {
            uri: "file://img1.jpg".to_string(),
        });
        assert_eq!(
            receiver.recv().await.unwrap(),
            ScanEvent::CaptureCompleted {
                uri: "file://img1.jpg".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_filtered_receiver() {
        let event_bus = EventBus::new(10);
        let filter = EventFilter::EventTypes(vec!["handoff_delivered"]);
        let mut filtered = EventReceiver::new(event_bus.subscribe(), filter, "test".to_string());

        event_bus.emit(ScanEvent::CaptureStarted {
            session_id: "s1".to_string(),
        });
        event_bus.emit(ScanEvent::HandoffDelivered {
            image_uri: "file://img1.jpg".to_string(),
            timestamp: "1700000000000".to_string(),
        });

        let event = timeout(Duration::from_millis(100), filtered.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.event_type(), "handoff_delivered");
    }

    #[tokio::test]
    async fn test_receiver_skips_lagged_events() {
        let event_bus = EventBus::new(2);
        let mut receiver =
            EventReceiver::new(event_bus.subscribe(), EventFilter::All, "slow".to_string());

        for n in 0..4 {
            event_bus.emit(ScanEvent::CaptureStarted {
                session_id: format!("s{}", n),
            });
        }

        // The two oldest were overwritten
        assert_eq!(
            receiver.recv().await.unwrap(),
            ScanEvent::CaptureStarted {
                session_id: "s2".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_receiver_reports_closed_bus() {
        let event_bus = EventBus::new(4);
        let mut receiver =
            EventReceiver::new(event_bus.subscribe(), EventFilter::All, "orphan".to_string());

        drop(event_bus);

        assert_eq!(receiver.recv().await, Err(EventBusError::ChannelClosed));
    }

    #[test]
    fn test_event_descriptions() {
        let event = ScanEvent::AlertRaised {
            title: "Erreur".to_string(),
            message: "Impossible de prendre la photo".to_string(),
        };
        assert_eq!(event.description(), "Erreur: Impossible de prendre la photo");
        assert_eq!(event.event_type(), "alert_raised");
    }
}
