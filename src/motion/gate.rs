//! Background-differencing motion gate.
//!
//! Holds a static grayscale reference per camera session and decides
//! whether the current frame differs from it enough to count as
//! motion. The reference is deliberately never updated adaptively:
//! slow lighting drift will eventually trip the gate, a known
//! limitation accepted in exchange for a baseline that cannot learn a
//! loitering person into the background.

use super::mask;
use crate::capture::Frame;
use image::GrayImage;
use imageproc::filter::gaussian_blur_f32;
use serde::{Deserialize, Serialize};

/// Outcome of evaluating one frame against the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// No reference existed; this frame became the reference.
    /// Not a statement about the scene.
    NoReference,
    /// Scene difference stayed below the area threshold.
    NoMotion,
    /// At least one changed region exceeded the area threshold.
    Motion,
}

/// Motion gate tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Gaussian smoothing strength applied before differencing.
    /// Strong enough by default to suppress sensor noise and small
    /// environmental flicker.
    pub blur_sigma: f32,
    /// Intensity cutoff for the binary difference mask.
    pub delta_threshold: u8,
    /// Dilation radius used to merge mask fragments.
    pub dilate_radius: u8,
    /// Minimum changed-region area, in pixels, to report motion.
    pub min_area: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 3.5,
            delta_threshold: 25,
            dilate_radius: 2,
            min_area: 500,
        }
    }
}

/// Decides whether frame-to-reference difference exceeds a
/// noise-tolerant area threshold.
pub struct MotionGate {
    config: MotionConfig,
    reference: Option<GrayImage>,
}

impl MotionGate {
    /// Creates a gate with no reference frame.
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            reference: None,
        }
    }

    /// Converts to smoothed luminance, the representation both the
    /// reference and every compared frame share.
    fn prepare(&self, frame: &Frame) -> GrayImage {
        let gray = frame.to_luma();
        if self.config.blur_sigma > 0.0 {
            gaussian_blur_f32(&gray, self.config.blur_sigma)
        } else {
            gray
        }
    }

    /// Evaluates one frame.
    ///
    /// The first frame after construction or [`reset`](Self::reset)
    /// primes the reference and yields [`GateDecision::NoReference`];
    /// callers must not treat that as a verdict about the scene.
    pub fn evaluate(&mut self, frame: &Frame) -> GateDecision {
        let smoothed = self.prepare(frame);

        if let Some(reference) = &self.reference {
            if reference.dimensions() == smoothed.dimensions() {
                let diff = mask::absolute_difference(reference, &smoothed);
                let binary = mask::binarize(&diff, self.config.delta_threshold);
                let dilated = mask::dilate_mask(&binary, self.config.dilate_radius);

                return if mask::has_region_larger_than(&dilated, self.config.min_area) {
                    GateDecision::Motion
                } else {
                    GateDecision::NoMotion
                };
            }
            // Resolution changed mid-session; treat as a fresh baseline
            tracing::warn!("reference dimensions stale, re-priming");
        }

        self.reference = Some(smoothed);
        GateDecision::NoReference
    }

    /// Drops the reference; the next frame re-primes it.
    ///
    /// Must be called whenever the camera session reconnects so the
    /// gate never compares against a baseline from a previous
    /// physical session.
    pub fn reset(&mut self) {
        self.reference = None;
    }

    /// Returns true if a reference frame is held.
    pub fn has_reference(&self) -> bool {
        self.reference.is_some()
    }
}
