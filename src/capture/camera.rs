//! Camera abstraction for frame capture.
//!
//! This module provides a trait-based abstraction over camera hardware,
//! allowing for both real camera input and mock implementations for
//! testing the monitoring pipeline without a device.

use super::{CaptureConfig, Frame};
use image::{Rgb, RgbImage};
use std::collections::VecDeque;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),
    #[error("failed to open camera: {0}")]
    OpenFailed(String),
    #[error("failed to configure camera: {0}")]
    ConfigFailed(String),
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    #[error("camera not initialized")]
    NotInitialized,
    #[error("gave up connecting after {0} attempts")]
    RetriesExhausted(u32),
}

/// Trait for camera implementations.
///
/// This abstraction allows swapping between real camera hardware
/// and mock implementations for testing.
pub trait Camera {
    /// Opens and initializes the camera with the given configuration.
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError>;

    /// Captures a single frame. May block until the device has one.
    fn capture(&mut self) -> Result<Frame, CameraError>;

    /// Checks if the camera is currently open.
    fn is_open(&self) -> bool;

    /// Closes the camera and releases the device handle.
    fn close(&mut self);
}

/// A scripted capture event for [`MockCamera`].
#[derive(Debug, Clone)]
enum ScriptEntry {
    Frame(RgbImage),
    ReadFailure,
}

/// Mock camera for testing that replays scripted frames.
///
/// With an empty script it generates a deterministic synthetic pattern,
/// paced at the configured frame rate so the demo binary behaves like a
/// blocking device read. Scripted entries return immediately.
#[derive(Debug, Default)]
pub struct MockCamera {
    config: Option<CaptureConfig>,
    sequence: u64,
    script: VecDeque<ScriptEntry>,
    failing_opens: u32,
}

impl MockCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a frame to be returned by the next unscripted `capture`.
    pub fn push_frame(&mut self, image: RgbImage) {
        self.script.push_back(ScriptEntry::Frame(image));
    }

    /// Queues a capture failure.
    pub fn push_read_failure(&mut self) {
        self.script.push_back(ScriptEntry::ReadFailure);
    }

    /// Makes the next `count` calls to `open` fail.
    pub fn fail_next_opens(&mut self, count: u32) {
        self.failing_opens = count;
    }

    fn synthetic_frame(&self, config: &CaptureConfig) -> RgbImage {
        let seq = self.sequence as u32;
        RgbImage::from_fn(config.width, config.height, |x, y| {
            Rgb([
                ((x + seq) % 256) as u8,
                ((y + seq) % 256) as u8,
                (((x + y) ^ seq) % 256) as u8,
            ])
        })
    }
}

impl Camera for MockCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        if self.failing_opens > 0 {
            self.failing_opens -= 1;
            return Err(CameraError::OpenFailed("scripted open failure".into()));
        }
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;
        self.config = Some(config.clone());
        self.sequence = 0;
        tracing::info!("MockCamera opened with config: {:?}", config);
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let config = self
            .config
            .as_ref()
            .ok_or(CameraError::NotInitialized)?
            .clone();

        match self.script.pop_front() {
            Some(ScriptEntry::Frame(image)) => {
                self.sequence += 1;
                Ok(Frame::new(image, self.sequence))
            }
            Some(ScriptEntry::ReadFailure) => {
                Err(CameraError::CaptureFailed("scripted read failure".into()))
            }
            None => {
                // Synthetic frames pace like a blocking device read
                std::thread::sleep(Duration::from_millis(1000 / u64::from(config.fps.max(1))));
                let image = self.synthetic_frame(&config);
                self.sequence += 1;
                Ok(Frame::new(image, self.sequence))
            }
        }
    }

    fn is_open(&self) -> bool {
        self.config.is_some()
    }

    fn close(&mut self) {
        self.config = None;
        tracing::info!("MockCamera closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_camera_lifecycle() {
        let mut camera = MockCamera::new();
        let config = CaptureConfig::default();

        assert!(!camera.is_open());

        camera.open(&config).unwrap();
        assert!(camera.is_open());

        camera.push_frame(RgbImage::new(config.width, config.height));
        let frame = camera.capture().unwrap();
        assert_eq!(frame.sequence(), 1);

        camera.close();
        assert!(!camera.is_open());
    }

    #[test]
    fn test_capture_without_open() {
        let mut camera = MockCamera::new();
        assert!(matches!(camera.capture(), Err(CameraError::NotInitialized)));
    }

    #[test]
    fn test_scripted_frames_replay_in_order() {
        let mut camera = MockCamera::new();
        camera.open(&CaptureConfig::default()).unwrap();

        camera.push_frame(RgbImage::from_pixel(4, 4, Rgb([1, 1, 1])));
        camera.push_frame(RgbImage::from_pixel(4, 4, Rgb([2, 2, 2])));

        assert_eq!(camera.capture().unwrap().image().get_pixel(0, 0)[0], 1);
        assert_eq!(camera.capture().unwrap().image().get_pixel(0, 0)[0], 2);
    }

    #[test]
    fn test_scripted_read_failure() {
        let mut camera = MockCamera::new();
        camera.open(&CaptureConfig::default()).unwrap();

        camera.push_read_failure();
        camera.push_frame(RgbImage::new(4, 4));

        assert!(matches!(
            camera.capture(),
            Err(CameraError::CaptureFailed(_))
        ));
        assert!(camera.capture().is_ok());
    }

    #[test]
    fn test_scripted_open_failures() {
        let mut camera = MockCamera::new();
        camera.fail_next_opens(2);

        assert!(camera.open(&CaptureConfig::default()).is_err());
        assert!(camera.open(&CaptureConfig::default()).is_err());
        assert!(camera.open(&CaptureConfig::default()).is_ok());
    }
}
