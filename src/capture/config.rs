//! Capture and monitor configuration.
//!
//! Resolution and frame-rate settings are hints: capture devices are
//! free to ignore them, and every frame is resized to the configured
//! dimensions before processing so the pipeline sees one canonical
//! geometry.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for camera capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Camera device index.
    pub device_id: u32,
    /// Canonical frame width in pixels.
    pub width: u32,
    /// Canonical frame height in pixels.
    pub height: u32,
    /// Target frames per second (best-effort hint).
    pub fps: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_id: 0,
            width: 640,
            height: 480,
            fps: 30,
        }
    }
}

impl CaptureConfig {
    /// Creates a new configuration with the specified dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.fps == 0 || self.fps > 120 {
            return Err(ConfigError::InvalidFrameRate);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    #[error("invalid frame rate (must be 1-120 fps)")]
    InvalidFrameRate,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
///
/// Each section is owned by the module it tunes; this struct only
/// aggregates them for TOML loading.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub session: super::SessionConfig,
    #[serde(default)]
    pub motion: crate::motion::MotionConfig,
    #[serde(default)]
    pub illumination: crate::illumination::IlluminationConfig,
    #[serde(default)]
    pub detection: crate::detect::DetectionConfig,
    #[serde(default)]
    pub snapshot: crate::snapshot::SnapshotConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: FileConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.capture.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = CaptureConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_dimensions_invalid() {
        let mut config = CaptureConfig::default();
        config.width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }

    #[test]
    fn test_excessive_frame_rate_invalid() {
        let mut config = CaptureConfig::default();
        config.fps = 240;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFrameRate)
        ));
    }

    #[test]
    fn test_partial_file_config_uses_defaults() {
        let parsed: FileConfig = toml::from_str(
            r#"
            [capture]
            device_id = 1
            width = 320
            height = 240
            fps = 15

            [snapshot]
            output_dir = "captures"
            cooldown_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(parsed.capture.device_id, 1);
        assert_eq!(parsed.snapshot.cooldown_secs, 30);
        // Untouched sections fall back to defaults
        assert_eq!(parsed.motion.min_area, 500);
        assert_eq!(parsed.detection.confidence, 0.5);
    }
}
