//! Camera session lifecycle.
//!
//! Models connect/stream/reconnect as an explicit state machine so the
//! reconnection behavior is testable without hardware. The session is
//! the sole owner of the device handle; a failed read always releases
//! the handle before any reopen, so a half-dead device cannot hold a
//! lock across physical sessions.

use super::{Camera, CameraError, CaptureConfig, Frame};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle state of the capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No device handle held.
    Disconnected,
    /// Opening the device.
    Connecting,
    /// Device open, waiting out the warm-up interval.
    WarmingUp,
    /// Delivering frames.
    Streaming,
}

/// Session tuning: warm-up, reconnect backoff, retry bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Delay after opening before the first read, in milliseconds,
    /// to let auto-exposure and focus converge.
    pub warmup_ms: u64,
    /// Fixed delay between reconnect attempts, in milliseconds.
    pub backoff_ms: u64,
    /// Maximum consecutive connect attempts before giving up.
    /// `None` retries indefinitely; the monitor is long-running and
    /// a camera that comes back hours later should still be picked up.
    pub max_connect_attempts: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            warmup_ms: 2000,
            backoff_ms: 1000,
            max_connect_attempts: None,
        }
    }
}

/// Owns a camera and drives it through the session state machine.
///
/// Each successful connect bumps a generation counter. Downstream
/// holders of per-session state (the motion gate's reference frame)
/// watch the generation to know when their state went stale.
pub struct CameraSession<C: Camera> {
    camera: C,
    capture: CaptureConfig,
    config: SessionConfig,
    state: SessionState,
    generation: u64,
}

impl<C: Camera> CameraSession<C> {
    /// Creates a session around an unopened camera.
    pub fn new(camera: C, capture: CaptureConfig, config: SessionConfig) -> Self {
        Self {
            camera,
            capture,
            config,
            state: SessionState::Disconnected,
            generation: 0,
        }
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns true if frames can be read.
    pub fn is_streaming(&self) -> bool {
        self.state == SessionState::Streaming
    }

    /// Returns the generation counter, bumped on every successful
    /// (re)connect.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Canonical frame dimensions for this session.
    pub fn canonical_dimensions(&self) -> (u32, u32) {
        (self.capture.width, self.capture.height)
    }

    /// Performs a single connect attempt: open, warm up, stream.
    pub fn connect(&mut self) -> Result<(), CameraError> {
        if self.camera.is_open() {
            self.camera.close();
        }
        self.state = SessionState::Connecting;
        if let Err(e) = self.camera.open(&self.capture) {
            self.state = SessionState::Disconnected;
            return Err(e);
        }

        self.state = SessionState::WarmingUp;
        let warmup = Duration::from_millis(self.config.warmup_ms);
        if !warmup.is_zero() {
            std::thread::sleep(warmup);
        }

        self.state = SessionState::Streaming;
        self.generation += 1;
        tracing::info!(generation = self.generation, "camera session streaming");
        Ok(())
    }

    /// Connects with a fixed backoff between attempts.
    ///
    /// Under the default unbounded policy this returns only once a
    /// connect succeeds. With `max_connect_attempts` set, exhaustion
    /// yields [`CameraError::RetriesExhausted`].
    pub fn connect_with_retry(&mut self) -> Result<(), CameraError> {
        // A reconnect (as opposed to the very first connect) waits out
        // the backoff before touching the device again
        if self.generation > 0 {
            self.sleep_backoff();
        }

        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.connect() {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(attempt = attempts, error = %e, "camera connect failed");
                    if let Some(max) = self.config.max_connect_attempts {
                        if attempts >= max {
                            return Err(CameraError::RetriesExhausted(attempts));
                        }
                    }
                    self.sleep_backoff();
                }
            }
        }
    }

    fn sleep_backoff(&self) {
        let backoff = Duration::from_millis(self.config.backoff_ms);
        if !backoff.is_zero() {
            std::thread::sleep(backoff);
        }
    }

    /// Reads one frame.
    ///
    /// Any capture failure tears the session down to `Disconnected`,
    /// releasing the device handle. The caller decides when to
    /// reconnect.
    pub fn read(&mut self) -> Result<Frame, CameraError> {
        if self.state != SessionState::Streaming {
            return Err(CameraError::NotInitialized);
        }
        match self.camera.capture() {
            Ok(frame) => Ok(frame),
            Err(e) => {
                self.camera.close();
                self.state = SessionState::Disconnected;
                tracing::warn!(error = %e, "capture failed, session disconnected");
                Err(e)
            }
        }
    }

    /// Closes the session and releases the device.
    pub fn close(&mut self) {
        self.camera.close();
        self.state = SessionState::Disconnected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::MockCamera;
    use image::RgbImage;

    fn fast_session(camera: MockCamera) -> CameraSession<MockCamera> {
        let config = SessionConfig {
            warmup_ms: 0,
            backoff_ms: 0,
            max_connect_attempts: None,
        };
        CameraSession::new(camera, CaptureConfig::default(), config)
    }

    #[test]
    fn test_connect_reaches_streaming() {
        let mut session = fast_session(MockCamera::new());
        assert_eq!(session.state(), SessionState::Disconnected);

        session.connect().unwrap();
        assert_eq!(session.state(), SessionState::Streaming);
        assert_eq!(session.generation(), 1);
    }

    #[test]
    fn test_read_before_connect_fails() {
        let mut session = fast_session(MockCamera::new());
        assert!(matches!(session.read(), Err(CameraError::NotInitialized)));
    }

    #[test]
    fn test_read_failure_disconnects() {
        let mut camera = MockCamera::new();
        camera.push_read_failure();
        let mut session = fast_session(camera);

        session.connect().unwrap();
        assert!(session.read().is_err());
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[test]
    fn test_generation_bumps_per_reconnect() {
        let mut camera = MockCamera::new();
        camera.push_read_failure();
        camera.push_frame(RgbImage::new(640, 480));
        let mut session = fast_session(camera);

        session.connect().unwrap();
        assert_eq!(session.generation(), 1);

        let _ = session.read(); // fails, disconnects
        session.connect().unwrap();
        assert_eq!(session.generation(), 2);
        assert!(session.read().is_ok());
    }

    #[test]
    fn test_failed_open_stays_disconnected() {
        let mut camera = MockCamera::new();
        camera.fail_next_opens(1);
        let mut session = fast_session(camera);

        assert!(session.connect().is_err());
        assert_eq!(session.state(), SessionState::Disconnected);
        assert_eq!(session.generation(), 0);
    }

    #[test]
    fn test_bounded_retry_exhaustion() {
        let mut camera = MockCamera::new();
        camera.fail_next_opens(10);
        let config = SessionConfig {
            warmup_ms: 0,
            backoff_ms: 0,
            max_connect_attempts: Some(3),
        };
        let mut session = CameraSession::new(camera, CaptureConfig::default(), config);

        assert!(matches!(
            session.connect_with_retry(),
            Err(CameraError::RetriesExhausted(3))
        ));
    }

    #[test]
    fn test_unbounded_retry_eventually_connects() {
        let mut camera = MockCamera::new();
        camera.fail_next_opens(4);
        let mut session = fast_session(camera);

        session.connect_with_retry().unwrap();
        assert!(session.is_streaming());
    }
}
