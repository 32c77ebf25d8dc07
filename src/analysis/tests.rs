use super::*;
use crate::camera::CapturedImageRef;
use crate::error::{AnalysisError, ScanError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[test]
fn test_payload_derived_from_image() {
    let payload = AnalysisHandoffPayload::from_image(CapturedImageRef::new(
        "file://img1.jpg",
        1_700_000_000_000,
    ));

    assert_eq!(payload.image_uri(), "file://img1.jpg");
    assert_eq!(payload.timestamp(), "1700000000000");
}

#[test]
fn test_payload_keeps_empty_uri() {
    let payload = AnalysisHandoffPayload::from_image(CapturedImageRef::new("", 42));

    assert_eq!(payload.image_uri(), "");
    assert_eq!(payload.timestamp(), "42");
}

#[test]
fn test_payload_serializes_route_field_names() {
    let payload = AnalysisHandoffPayload::from_image(CapturedImageRef::new("file://a.jpg", 7));
    let json = serde_json::to_value(&payload).unwrap();

    assert_eq!(
        json,
        serde_json::json!({ "imageUri": "file://a.jpg", "timestamp": "7" })
    );
}

#[tokio::test]
async fn test_simulator_waits_fixed_latency() {
    tokio::time::pause();
    let simulator = AnalysisJobSimulator::new(Duration::from_millis(1500));
    let start = Instant::now();

    let payload = simulator
        .run(CapturedImageRef::new("file://img1.jpg", 1_700_000_000_000))
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_millis(1500));
    assert_eq!(payload.timestamp(), "1700000000000");
    assert_eq!(simulator.run_count(), 1);
}

#[tokio::test]
async fn test_simulator_scripted_failure() {
    tokio::time::pause();
    let simulator = AnalysisJobSimulator::new(Duration::from_millis(10)).then_fail("model offline");

    let err = simulator
        .run(CapturedImageRef::new("file://img1.jpg", 1))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AnalysisError::Failed {
            details: "model offline".to_string()
        }
    );

    // Script exhausted, next run succeeds
    assert!(simulator
        .run(CapturedImageRef::new("file://img2.jpg", 2))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_stage_times_out_slow_job() {
    tokio::time::pause();
    let stage = AnalysisStage::new(
        Arc::new(AnalysisJobSimulator::new(Duration::from_secs(30))),
        Some(Duration::from_secs(10)),
    );

    let err = stage
        .run(CapturedImageRef::new("file://img1.jpg", 1))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ScanError::Analysis(AnalysisError::Timeout { after }) if after == Duration::from_secs(10)
    ));
}

#[tokio::test]
async fn test_stage_without_timeout_waits_for_job() {
    tokio::time::pause();
    let stage = AnalysisStage::new(
        Arc::new(AnalysisJobSimulator::new(Duration::from_secs(30))),
        None,
    );

    let payload = stage
        .run(CapturedImageRef::new("file://slow.jpg", 5))
        .await
        .unwrap();
    assert_eq!(payload.image_uri(), "file://slow.jpg");
}
