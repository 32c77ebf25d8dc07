use super::*;
use crate::config::FeedbackConfig;
use std::sync::Arc;

#[test]
fn test_emit_fires_configured_strength() {
    let haptics = Arc::new(RecordingHaptics::new());
    let emitter = FeedbackEmitter::new(haptics.clone(), ImpactStrength::Medium);

    emitter.emit(FeedbackKind::ToggleFacing);
    emitter.emit(FeedbackKind::CaptureStart);

    assert_eq!(
        haptics.impulses(),
        vec![ImpactStrength::Medium, ImpactStrength::Medium]
    );
}

#[test]
fn test_emit_is_noop_without_capability() {
    let haptics = Arc::new(RecordingHaptics::unsupported());
    let emitter = FeedbackEmitter::new(haptics.clone(), ImpactStrength::Heavy);

    emitter.emit(FeedbackKind::CaptureStart);

    assert_eq!(haptics.impulse_count(), 0);
}

#[test]
fn test_emit_swallows_device_failures() {
    let haptics = Arc::new(RecordingHaptics::failing());
    let emitter = FeedbackEmitter::new(haptics.clone(), ImpactStrength::Light);

    // Must not panic or propagate
    emitter.emit(FeedbackKind::Back);
    emitter.emit(FeedbackKind::Back);

    assert_eq!(haptics.impulse_count(), 2);
}

#[test]
fn test_disabled_config_skips_device() {
    let haptics = Arc::new(RecordingHaptics::new());
    let config = FeedbackConfig {
        enabled: false,
        strength: ImpactStrength::Heavy,
    };
    let emitter = FeedbackEmitter::from_config(&config, haptics.clone());

    emitter.emit(FeedbackKind::ToggleFacing);

    assert_eq!(haptics.impulse_count(), 0);
}
