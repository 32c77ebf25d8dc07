use super::orchestrator::ScanWorkflow;
use crate::analysis::{AnalysisJob, AnalysisJobSimulator, AnalysisStage};
use crate::camera::CameraDevice;
use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::events::EventBus;
use crate::feedback::{FeedbackEmitter, HapticDevice};
use crate::handoff::{Navigator, ResultHandoff};
use crate::permission::{CameraAuthorizer, PermissionGate};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Builder for a [`ScanWorkflow`].
///
/// Camera, authorizer and navigator are required. Without a haptic device
/// feedback is disabled; without an analysis job the fixed-latency simulator
/// from the configuration is used.
#[derive(Default)]
pub struct ScanWorkflowBuilder {
    config: Option<ScanConfig>,
    camera: Option<Arc<dyn CameraDevice>>,
    authorizer: Option<Arc<dyn CameraAuthorizer>>,
    haptics: Option<Arc<dyn HapticDevice>>,
    analysis_job: Option<Arc<dyn AnalysisJob>>,
    navigator: Option<Arc<dyn Navigator>>,
    event_bus: Option<Arc<EventBus>>,
}

impl ScanWorkflowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ScanConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn camera(mut self, camera: Arc<dyn CameraDevice>) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn authorizer(mut self, authorizer: Arc<dyn CameraAuthorizer>) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    pub fn haptics(mut self, haptics: Arc<dyn HapticDevice>) -> Self {
        self.haptics = Some(haptics);
        self
    }

    pub fn analysis_job(mut self, job: Arc<dyn AnalysisJob>) -> Self {
        self.analysis_job = Some(job);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn build(self) -> Result<ScanWorkflow> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let camera = self
            .camera
            .ok_or_else(|| ScanError::system("Camera device must be specified"))?;
        let authorizer = self
            .authorizer
            .ok_or_else(|| ScanError::system("Camera authorizer must be specified"))?;
        let navigator = self
            .navigator
            .ok_or_else(|| ScanError::system("Navigator must be specified"))?;

        let feedback = match self.haptics {
            Some(device) => FeedbackEmitter::from_config(&config.feedback, device),
            None => FeedbackEmitter::disabled(),
        };
        let job = self
            .analysis_job
            .unwrap_or_else(|| Arc::new(AnalysisJobSimulator::from_config(&config.analysis)));
        let event_bus = self
            .event_bus
            .unwrap_or_else(|| Arc::new(EventBus::new(config.system.event_bus_capacity)));

        Ok(ScanWorkflow {
            analysis: AnalysisStage::new(job, config.analysis.timeout()),
            camera,
            permission: Arc::new(PermissionGate::new(authorizer)),
            feedback,
            handoff: ResultHandoff::new(navigator),
            event_bus,
            controller: RwLock::new(None),
            alert: Mutex::new(None),
            config,
        })
    }
}
