//! Camera input and session lifecycle.
//!
//! This module provides abstractions for capturing frames from a
//! camera, the session state machine that owns the device handle and
//! reconnects after failures, and the configuration surface for the
//! whole monitor.

mod camera;
mod config;
mod frame;
#[cfg(feature = "camera")]
mod nokhwa;
mod session;

pub use camera::{Camera, CameraError, MockCamera};
pub use config::{CaptureConfig, ConfigError, FileConfig};
pub use frame::Frame;
#[cfg(feature = "camera")]
pub use nokhwa::NokhwaCamera;
pub use session::{CameraSession, SessionConfig, SessionState};
