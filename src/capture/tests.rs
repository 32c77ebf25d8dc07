use super::*;
use crate::camera::{CapturedImageRef, FacingDirection, SimulatedCamera};
use crate::config::ScanConfig;
use crate::error::{CaptureError, PermissionError, Result, ScanError};
use crate::feedback::{FeedbackEmitter, ImpactStrength, RecordingHaptics};
use crate::permission::{PermissionGate, SimulatedAuthorizer};
use std::sync::Arc;
use std::time::Duration;

struct Fixture {
    controller: Arc<CaptureController>,
    camera: Arc<SimulatedCamera>,
    haptics: Arc<RecordingHaptics>,
}

async fn create_fixture(camera: SimulatedCamera, authorizer: SimulatedAuthorizer) -> Fixture {
    let config = ScanConfig::default();
    let camera = Arc::new(camera);
    let haptics = Arc::new(RecordingHaptics::new());
    let gate = Arc::new(PermissionGate::new(Arc::new(authorizer)));
    gate.refresh().await;

    let controller = Arc::new(CaptureController::new(
        camera.clone(),
        gate,
        FeedbackEmitter::new(haptics.clone(), ImpactStrength::Medium),
        &config.camera,
    ));

    Fixture {
        controller,
        camera,
        haptics,
    }
}

async fn capture(controller: &CaptureController) -> Result<(CaptureGuard, CapturedImageRef)> {
    let guard = controller.begin_capture()?;
    let image = controller.take_photo(&guard).await?;
    Ok((guard, image))
}

#[tokio::test]
async fn test_toggle_alternates_from_back() {
    let fixture = create_fixture(SimulatedCamera::new("file:///tmp"), SimulatedAuthorizer::granted()).await;
    let controller = &fixture.controller;

    assert_eq!(controller.facing(), FacingDirection::Back);
    assert_eq!(controller.toggle_facing(), Some(FacingDirection::Front));
    assert_eq!(controller.toggle_facing(), Some(FacingDirection::Back));
    assert_eq!(controller.toggle_facing(), Some(FacingDirection::Front));
    assert_eq!(fixture.haptics.impulse_count(), 3);
}

#[tokio::test]
async fn test_toggle_ignored_without_permission() {
    let fixture = create_fixture(
        SimulatedCamera::new("file:///tmp"),
        SimulatedAuthorizer::always_denies(),
    )
    .await;

    assert_eq!(fixture.controller.toggle_facing(), None);
    assert_eq!(fixture.controller.facing(), FacingDirection::Back);
    assert_eq!(fixture.haptics.impulse_count(), 0);
}

#[tokio::test]
async fn test_capture_success_keeps_session_busy_until_dropped() {
    let fixture = create_fixture(
        SimulatedCamera::new("file:///tmp").then_return("file://img1.jpg", 1_700_000_000_000),
        SimulatedAuthorizer::granted(),
    )
    .await;
    let controller = &fixture.controller;

    let (guard, image) = capture(controller).await.unwrap();
    assert_eq!(image.uri(), "file://img1.jpg");
    assert_eq!(image.captured_at_epoch_millis(), 1_700_000_000_000);
    assert!(controller.is_capturing());

    // Toggle is locked while the cycle holds the flag
    assert_eq!(controller.toggle_facing(), None);

    drop(guard);
    assert!(!controller.is_capturing());
    assert_eq!(fixture.camera.last_request(), Some((FacingDirection::Back, 0.8)));
}

#[tokio::test]
async fn test_capture_failure_resets_flag() {
    let fixture = create_fixture(
        SimulatedCamera::new("file:///tmp").then_fail("shutter jammed"),
        SimulatedAuthorizer::granted(),
    )
    .await;
    let controller = &fixture.controller;

    let err = capture(controller).await.unwrap_err();
    assert!(matches!(
        err,
        ScanError::Capture(CaptureError::Hardware { .. })
    ));
    assert!(!controller.is_capturing());

    // No automatic retry
    assert_eq!(fixture.camera.shot_count(), 1);
}

#[tokio::test]
async fn test_capture_requires_permission() {
    let fixture = create_fixture(
        SimulatedCamera::new("file:///tmp"),
        SimulatedAuthorizer::always_denies(),
    )
    .await;

    let err = capture(&fixture.controller).await.unwrap_err();
    assert!(matches!(
        err,
        ScanError::Permission(PermissionError::Denied)
    ));
    assert!(!fixture.controller.is_capturing());
    assert_eq!(fixture.camera.shot_count(), 0);
    assert_eq!(fixture.haptics.impulse_count(), 0);
}

#[tokio::test]
async fn test_capture_while_busy_is_rejected() {
    tokio::time::pause();
    let fixture = create_fixture(
        SimulatedCamera::new("file:///tmp").with_latency(Duration::from_millis(500)),
        SimulatedAuthorizer::granted(),
    )
    .await;

    let first = tokio::spawn({
        let controller = Arc::clone(&fixture.controller);
        async move { capture(&controller).await.map(|(_, image)| image.uri().to_string()) }
    });

    // Let the first capture claim the flag and park on the shutter
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(fixture.controller.is_capturing());

    let err = capture(&fixture.controller).await.unwrap_err();
    assert!(matches!(err, ScanError::Capture(CaptureError::Busy)));

    assert!(first.await.unwrap().is_ok());
    assert!(!fixture.controller.is_capturing());
    assert_eq!(fixture.camera.shot_count(), 1);
    // Feedback fired once, at the start of the accepted capture
    assert_eq!(fixture.haptics.impulse_count(), 1);
}

#[tokio::test]
async fn test_busy_rejection_ignores_permission_state() {
    let fixture = create_fixture(
        SimulatedCamera::new("file:///tmp"),
        SimulatedAuthorizer::always_denies(),
    )
    .await;

    let _guard = fixture.controller.session().try_begin_capture().unwrap();

    let err = capture(&fixture.controller).await.unwrap_err();
    assert!(matches!(err, ScanError::Capture(CaptureError::Busy)));
}

#[tokio::test]
async fn test_abandoned_capture_releases_flag() {
    tokio::time::pause();
    let fixture = create_fixture(
        SimulatedCamera::new("file:///tmp").with_latency(Duration::from_secs(5)),
        SimulatedAuthorizer::granted(),
    )
    .await;

    let task = tokio::spawn({
        let controller = Arc::clone(&fixture.controller);
        async move {
            let _ = capture(&controller).await;
        }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(fixture.controller.is_capturing());

    task.abort();
    let _ = task.await;

    assert!(!fixture.controller.is_capturing());
}

#[tokio::test]
async fn test_closed_session_rejects_capture() {
    let fixture = create_fixture(SimulatedCamera::new("file:///tmp"), SimulatedAuthorizer::granted()).await;
    let ticket = fixture.controller.ticket();

    fixture.controller.close();

    assert!(!ticket.is_current());
    let err = capture(&fixture.controller).await.unwrap_err();
    assert!(matches!(
        err,
        ScanError::Capture(CaptureError::Unavailable { .. })
    ));
    assert!(!fixture.controller.is_capturing());
}

#[test]
fn test_session_ticket_follows_session() {
    let session = CaptureSession::new(FacingDirection::Front);
    let ticket = session.ticket();

    assert_eq!(ticket.session_id(), session.id());
    assert!(ticket.is_current());

    session.close();
    assert!(!ticket.is_current());
    assert!(!session.is_current());
}
