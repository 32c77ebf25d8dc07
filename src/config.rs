use crate::camera::FacingDirection;
use crate::feedback::ImpactStrength;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScanConfig {
    pub camera: CameraConfig,
    pub analysis: AnalysisConfig,
    pub feedback: FeedbackConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CameraConfig {
    /// JPEG quality factor handed to the take-photo call (0, 1]
    #[serde(default = "default_camera_quality")]
    pub quality: f32,

    /// Sensor selected when a screen is activated
    #[serde(default = "default_camera_facing")]
    pub default_facing: FacingDirection,

    /// URI prefix for images written by the simulated camera
    #[serde(default = "default_camera_output_dir")]
    pub output_dir: String,

    /// Shutter latency of the simulated camera in milliseconds
    #[serde(default = "default_camera_latency")]
    pub simulated_latency_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AnalysisConfig {
    /// Fixed delay of the stand-in diagnosis in milliseconds
    #[serde(default = "default_analysis_latency")]
    pub latency_ms: u64,

    /// Upper bound on a diagnosis in milliseconds (0 disables the timeout)
    #[serde(default = "default_analysis_timeout")]
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FeedbackConfig {
    /// Enable haptic pulses on user actions
    #[serde(default = "default_feedback_enabled")]
    pub enabled: bool,

    /// Impulse strength for every pulse
    #[serde(default = "default_feedback_strength")]
    pub strength: ImpactStrength,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SystemConfig {
    /// Event bus capacity
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

impl AnalysisConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

impl ScanConfig {
    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("camera.quality", default_camera_quality() as f64)?
            .set_default("camera.default_facing", "Back")?
            .set_default("camera.output_dir", default_camera_output_dir())?
            .set_default("camera.simulated_latency_ms", default_camera_latency())?
            .set_default("analysis.latency_ms", default_analysis_latency())?
            .set_default("analysis.timeout_ms", default_analysis_timeout())?
            .set_default("feedback.enabled", default_feedback_enabled())?
            .set_default("feedback.strength", "Medium")?
            .set_default(
                "system.event_bus_capacity",
                default_event_bus_capacity() as i64,
            )?
            .add_source(File::with_name(&path_str).required(false))
            // PLANTSCAN__CAMERA__QUALITY style overrides
            .add_source(Environment::with_prefix("PLANTSCAN").separator("__"))
            .build()?;

        let config: ScanConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.camera.quality > 0.0 && self.camera.quality <= 1.0) {
            return Err(ConfigError::Message(
                "Camera quality must be in the range (0, 1]".to_string(),
            ));
        }

        if self.camera.output_dir.trim().is_empty() {
            return Err(ConfigError::Message(
                "Camera output_dir must not be empty".to_string(),
            ));
        }

        if let Some(timeout) = self.analysis.timeout() {
            if timeout <= self.analysis.latency() {
                return Err(ConfigError::Message(
                    "Analysis timeout_ms must exceed latency_ms".to_string(),
                ));
            }
        }

        if self.system.event_bus_capacity == 0 {
            return Err(ConfigError::Message(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Render the configuration as a TOML document
    pub fn to_toml(&self) -> crate::error::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig {
                quality: default_camera_quality(),
                default_facing: default_camera_facing(),
                output_dir: default_camera_output_dir(),
                simulated_latency_ms: default_camera_latency(),
            },
            analysis: AnalysisConfig {
                latency_ms: default_analysis_latency(),
                timeout_ms: default_analysis_timeout(),
            },
            feedback: FeedbackConfig {
                enabled: default_feedback_enabled(),
                strength: default_feedback_strength(),
            },
            system: SystemConfig {
                event_bus_capacity: default_event_bus_capacity(),
            },
        }
    }
}

fn default_camera_quality() -> f32 {
    0.8
}
fn default_camera_facing() -> FacingDirection {
    FacingDirection::Back
}
fn default_camera_output_dir() -> String {
    "file:///tmp/plantscan".to_string()
}
fn default_camera_latency() -> u64 {
    200
}

fn default_analysis_latency() -> u64 {
    1500
}
fn default_analysis_timeout() -> u64 {
    10_000
}

fn default_feedback_enabled() -> bool {
    true
}
fn default_feedback_strength() -> ImpactStrength {
    ImpactStrength::Medium
}

fn default_event_bus_capacity() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.camera.default_facing, FacingDirection::Back);
        assert_eq!(config.analysis.latency(), Duration::from_millis(1500));
        assert_eq!(config.analysis.timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_config_validation() {
        let mut config = ScanConfig::default();
        config.camera.quality = 0.0;
        assert!(config.validate().is_err());

        config.camera.quality = 1.0;
        assert!(config.validate().is_ok());

        config.analysis.timeout_ms = 1000;
        assert!(config.validate().is_err());

        // Zero disables the timeout entirely
        config.analysis.timeout_ms = 0;
        assert!(config.validate().is_ok());
        assert_eq!(config.analysis.timeout(), None);

        config.system.event_bus_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[camera]
quality = 0.5
default_facing = "Front"

[analysis]
latency_ms = 50

[feedback]
enabled = false
strength = "Heavy"
"#
        )
        .unwrap();

        let config = ScanConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.camera.quality, 0.5);
        assert_eq!(config.camera.default_facing, FacingDirection::Front);
        assert_eq!(config.camera.output_dir, "file:///tmp/plantscan");
        assert_eq!(config.analysis.latency_ms, 50);
        assert_eq!(config.analysis.timeout_ms, 10_000);
        assert!(!config.feedback.enabled);
        assert_eq!(config.feedback.strength, ImpactStrength::Heavy);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScanConfig::load_from_file(dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.camera.quality, 0.8);
        assert_eq!(config.system.event_bus_capacity, 100);
    }

    #[test]
    fn test_toml_round_trip_of_defaults() {
        let rendered = ScanConfig::default().to_toml().unwrap();
        let parsed: ScanConfig = toml::from_str(&rendered).unwrap();

        assert_eq!(parsed.camera.default_facing, FacingDirection::Back);
        assert_eq!(parsed.feedback.strength, ImpactStrength::Medium);
    }
}
