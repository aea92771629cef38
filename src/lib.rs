//! Nightwatch: single-camera presence monitor.
//!
//! Continuously samples frames from one camera, detects motion via
//! background differencing, escalates motion to a person-presence
//! check, and persists snapshots under a cooldown policy.
//!
//! # Architecture
//!
//! The system follows an explicit data flow, one iteration per frame:
//!
//! ```text
//! capture → illumination → motion gate → presence → snapshot
//!     ↓           ↓             ↓            ↓
//!            monitor (orchestration + overlay)
//! ```
//!
//! # Design Principles
//!
//! - **Gate before inference**: the detector only runs when the cheap
//!   motion gate fires
//! - **The loop is the unit of resilience**: read failures reconnect,
//!   write failures drop one frame; only startup errors are fatal
//! - **One variant per iteration**: detection and the persisted
//!   snapshot always see the same (raw or enhanced) frame
//! - **Static reference baseline**: reset per camera session, never
//!   adapted, so a loitering person cannot fade into the background
//!
//! # Example
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//!
//! use nightwatch::{
//!     capture::{FileConfig, MockCamera},
//!     detect::ScriptedDetector,
//!     monitor::Monitor,
//! };
//!
//! let config = FileConfig::default();
//! let quit = Arc::new(AtomicBool::new(false));
//!
//! let mut monitor = Monitor::from_config(
//!     MockCamera::new(),
//!     ScriptedDetector::new(),
//!     &config,
//!     quit,
//! );
//! monitor.run().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod detect;
pub mod illumination;
pub mod monitor;
pub mod motion;
pub mod snapshot;

// Re-export commonly used types at crate root
pub use capture::{Camera, CameraError, CameraSession, CaptureConfig, FileConfig, Frame, MockCamera};
pub use detect::{BoundingBox, DetectorError, PersonDetector, Presence, PresenceEscalator};
pub use illumination::{Illumination, IlluminationAdapter};
pub use monitor::{Monitor, MonitorError, MonitorStatus, Outcome};
pub use motion::{GateDecision, MotionGate};
pub use snapshot::{SnapshotOutcome, SnapshotThrottle};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
