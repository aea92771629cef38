//! Native camera backend via `nokhwa`.
//!
//! Only compiled with the `camera` feature. Backend selection is
//! delegated to nokhwa's platform-native input (MSMF on Windows,
//! AVFoundation on macOS, V4L2 on Linux); resolution and frame rate
//! are requested as closest-match hints the device may ignore.

use super::{Camera, CameraError, CaptureConfig, Frame};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};

/// Camera implementation backed by the platform-native capture API.
pub struct NokhwaCamera {
    inner: Option<nokhwa::Camera>,
    sequence: u64,
}

impl NokhwaCamera {
    /// Creates an unopened camera.
    pub fn new() -> Self {
        Self {
            inner: None,
            sequence: 0,
        }
    }
}

impl Default for NokhwaCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera for NokhwaCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;

        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(config.width, config.height),
                FrameFormat::MJPEG,
                config.fps,
            ),
        ));
        let mut camera = nokhwa::Camera::new(CameraIndex::Index(config.device_id), requested)
            .map_err(|e| CameraError::DeviceNotFound(e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| CameraError::OpenFailed(e.to_string()))?;

        self.inner = Some(camera);
        self.sequence = 0;
        tracing::info!(device = config.device_id, "native camera stream opened");
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let camera = self.inner.as_mut().ok_or(CameraError::NotInitialized)?;
        let buffer = camera
            .frame()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
        let image = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;

        self.sequence += 1;
        Ok(Frame::new(image, self.sequence))
    }

    fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.inner.take() {
            let _ = camera.stop_stream();
            tracing::info!("native camera released");
        }
    }
}
