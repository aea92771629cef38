//! Frame-loop orchestration.
//!
//! Composes the camera session, motion gate, illumination adapter,
//! presence escalator and snapshot throttle into one blocking loop.
//! All mutable loop state lives on the [`Monitor`] struct and the
//! clock is injected per step, so a single iteration can be driven in
//! tests without hardware or wall-clock sleeps.

mod overlay;

pub use overlay::{annotate, MonitorStatus};

use crate::capture::{Camera, CameraError, CameraSession, FileConfig, Frame};
use crate::detect::{BoundingBox, PersonDetector, Presence, PresenceEscalator};
use crate::illumination::{Illumination, IlluminationAdapter};
use crate::motion::{GateDecision, MotionGate};
use crate::snapshot::{SkipReason, SnapshotOutcome, SnapshotThrottle};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Fatal monitor errors. Per-iteration failures never surface here;
/// the loop is the unit of resilience.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("camera session failed: {0}")]
    Camera(#[from] CameraError),
}

/// What a single loop iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The session was (re)established this iteration; no frame read.
    Reconnected,
    /// A read failed; the session was torn down for reconnect.
    CaptureFailed,
    /// First frame after (re)connect primed the motion reference.
    ReferenceEstablished,
    /// No motion.
    Quiet,
    /// Motion without a confirmed person.
    MotionOnly,
    /// Persons confirmed; snapshot persisted unless throttled.
    Persons {
        /// Number of person boxes.
        count: usize,
        /// Path of the persisted snapshot, if the cooldown allowed one.
        snapshot: Option<PathBuf>,
    },
}

/// Report for one iteration: the outcome plus the annotated frame a
/// display sink would show.
#[derive(Debug)]
pub struct Iteration {
    /// What happened.
    pub outcome: Outcome,
    /// The selected frame variant with overlay applied, when a frame
    /// was processed this iteration.
    pub frame: Option<Frame>,
    /// How the frame was classified, when one was processed.
    pub illumination: Option<Illumination>,
}

impl Iteration {
    fn frameless(outcome: Outcome) -> Self {
        Self {
            outcome,
            frame: None,
            illumination: None,
        }
    }
}

/// The single-camera monitoring loop.
///
/// Single-threaded and blocking: capture, processing, inference and
/// I/O run in strict sequence per frame. Cancellation is cooperative,
/// polled once per iteration via the shared quit flag.
pub struct Monitor<C: Camera, D: PersonDetector> {
    session: CameraSession<C>,
    detector: D,
    gate: MotionGate,
    adapter: IlluminationAdapter,
    escalator: PresenceEscalator,
    throttle: SnapshotThrottle,
    width: u32,
    height: u32,
    seen_generation: u64,
    quit: Arc<AtomicBool>,
}

impl<C: Camera, D: PersonDetector> Monitor<C, D> {
    /// Builds the full pipeline from a camera, a detector capability
    /// and the aggregate configuration.
    pub fn from_config(camera: C, detector: D, config: &FileConfig, quit: Arc<AtomicBool>) -> Self {
        let session = CameraSession::new(camera, config.capture.clone(), config.session.clone());
        Self {
            width: config.capture.width,
            height: config.capture.height,
            gate: MotionGate::new(config.motion.clone()),
            adapter: IlluminationAdapter::new(config.illumination.clone()),
            escalator: PresenceEscalator::new(config.detection.clone()),
            throttle: SnapshotThrottle::new(config.snapshot.clone()),
            seen_generation: 0,
            session,
            detector,
            quit,
        }
    }

    /// Read access to the session, for embedders and tests.
    pub fn session(&self) -> &CameraSession<C> {
        &self.session
    }

    /// Read access to the detector capability.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Returns true if the motion gate currently holds a reference.
    pub fn has_reference(&self) -> bool {
        self.gate.has_reference()
    }

    /// Runs one iteration of the loop.
    ///
    /// `now` feeds the snapshot cooldown clock. Returns `Err` only for
    /// startup-class failures (connect retries exhausted under a
    /// bounded policy); everything else is an [`Outcome`].
    pub fn step(&mut self, now: Instant) -> Result<Iteration, MonitorError> {
        if !self.session.is_streaming() {
            self.session.connect_with_retry()?;
            return Ok(Iteration::frameless(Outcome::Reconnected));
        }

        if self.session.generation() != self.seen_generation {
            // New physical session; a stale baseline must not leak in
            self.gate.reset();
            self.seen_generation = self.session.generation();
        }

        let frame = match self.session.read() {
            Ok(frame) => frame,
            Err(error) => {
                tracing::warn!(error = %error, "frame read failed, will reconnect");
                return Ok(Iteration::frameless(Outcome::CaptureFailed));
            }
        };
        let frame = frame.resized(self.width, self.height);

        let (selected, illumination) = self.adapter.adapt(&frame);

        // The gate always compares raw frames; enhancement exists for
        // the detector and the archive, not for differencing.
        let decision = self.gate.evaluate(&frame);
        if decision == GateDecision::NoReference {
            tracing::info!("motion reference established");
            return Ok(Iteration {
                outcome: Outcome::ReferenceEstablished,
                frame: Some(selected),
                illumination: Some(illumination),
            });
        }

        let presence = match self
            .escalator
            .escalate(&mut self.detector, selected.image(), decision)
        {
            Ok(presence) => presence,
            Err(error) => {
                // Inference failure is isolated to this iteration
                tracing::warn!(error = %error, "detector failed, downgrading to general motion");
                Presence::GeneralMotion
            }
        };

        let mut snapshot = None;
        match self.throttle.try_persist(selected.image(), &presence, now) {
            Ok(SnapshotOutcome::Persisted(path)) => snapshot = Some(path),
            Ok(SnapshotOutcome::Skipped(SkipReason::CoolingDown { remaining_secs })) => {
                tracing::debug!(remaining_secs, "snapshot throttled");
            }
            Ok(SnapshotOutcome::Skipped(SkipReason::NotPerson)) => {}
            Err(error) => {
                tracing::warn!(error = %error, "snapshot write failed, frame dropped");
            }
        }

        let status = match &presence {
            Presence::None => MonitorStatus::Monitoring,
            Presence::GeneralMotion => MonitorStatus::MotionDetected,
            Presence::Persons(boxes) => MonitorStatus::PersonAlert(boxes.len()),
        };
        let boxes: &[BoundingBox] = match &presence {
            Presence::Persons(boxes) => boxes,
            _ => &[],
        };
        let mut selected = selected;
        overlay::annotate(selected.image_mut(), status, boxes);

        let outcome = match presence {
            Presence::None => Outcome::Quiet,
            Presence::GeneralMotion => Outcome::MotionOnly,
            Presence::Persons(boxes) => Outcome::Persons {
                count: boxes.len(),
                snapshot,
            },
        };

        Ok(Iteration {
            outcome,
            frame: Some(selected),
            illumination: Some(illumination),
        })
    }

    /// Runs until the quit flag is set, then releases the camera.
    ///
    /// Per-iteration errors are absorbed; only startup-class camera
    /// errors propagate.
    pub fn run(&mut self) -> Result<(), MonitorError> {
        while !self.quit.load(Ordering::Relaxed) {
            let iteration = self.step(Instant::now())?;
            match &iteration.outcome {
                Outcome::Persons { count, snapshot } => {
                    tracing::warn!(count = *count, snapshot = ?snapshot, "person detected");
                }
                Outcome::MotionOnly => tracing::info!("motion without person"),
                Outcome::Reconnected
                | Outcome::CaptureFailed
                | Outcome::ReferenceEstablished
                | Outcome::Quiet => {}
            }
        }
        self.session.close();
        tracing::info!("monitor stopped");
        Ok(())
    }
}
