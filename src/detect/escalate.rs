//! Motion-to-presence escalation.
//!
//! Detector inference is the expensive step in the pipeline; the
//! escalator only pays for it when the motion gate has already fired.

use super::{BoundingBox, DetectorError, PersonDetector};
use crate::motion::GateDecision;
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// What this iteration's frame is believed to contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    /// The gate did not fire; the detector was not consulted.
    None,
    /// Motion without any qualifying person detection.
    GeneralMotion,
    /// One or more person detections.
    Persons(Vec<BoundingBox>),
}

/// Detection tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Confidence threshold handed to the detector capability.
    pub confidence: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self { confidence: 0.5 }
    }
}

/// Runs the detector capability only when the motion gate fired.
pub struct PresenceEscalator {
    config: DetectionConfig,
}

impl PresenceEscalator {
    /// Creates an escalator with the given tuning.
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Decides between "nothing", "motion" and "person" outcomes.
    ///
    /// `NoReference` and `NoMotion` both short-circuit to
    /// [`Presence::None`] without touching the detector.
    pub fn escalate<D: PersonDetector>(
        &self,
        detector: &mut D,
        image: &RgbImage,
        gate: GateDecision,
    ) -> Result<Presence, DetectorError> {
        if gate != GateDecision::Motion {
            return Ok(Presence::None);
        }

        let boxes = detector.detect(image, self.config.confidence)?;
        if boxes.is_empty() {
            Ok(Presence::GeneralMotion)
        } else {
            tracing::debug!(count = boxes.len(), "person detections above threshold");
            Ok(Presence::Persons(boxes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::ScriptedDetector;

    fn escalator() -> PresenceEscalator {
        PresenceEscalator::new(DetectionConfig::default())
    }

    #[test]
    fn test_no_motion_skips_detector() {
        let mut detector = ScriptedDetector::new();
        let image = RgbImage::new(16, 16);

        let outcome = escalator()
            .escalate(&mut detector, &image, GateDecision::NoMotion)
            .unwrap();
        assert_eq!(outcome, Presence::None);

        let outcome = escalator()
            .escalate(&mut detector, &image, GateDecision::NoReference)
            .unwrap();
        assert_eq!(outcome, Presence::None);

        assert_eq!(detector.calls(), 0);
    }

    #[test]
    fn test_motion_without_detections_is_general() {
        let mut detector = ScriptedDetector::new();
        let image = RgbImage::new(16, 16);

        let outcome = escalator()
            .escalate(&mut detector, &image, GateDecision::Motion)
            .unwrap();
        assert_eq!(outcome, Presence::GeneralMotion);
        assert_eq!(detector.calls(), 1);
    }

    #[test]
    fn test_motion_with_detections_is_persons() {
        let mut detector = ScriptedDetector::new();
        detector.push_response(vec![
            BoundingBox::new(0, 0, 10, 10),
            BoundingBox::new(20, 20, 40, 60),
        ]);
        let image = RgbImage::new(64, 64);

        match escalator()
            .escalate(&mut detector, &image, GateDecision::Motion)
            .unwrap()
        {
            Presence::Persons(boxes) => assert_eq!(boxes.len(), 2),
            other => panic!("expected persons, got {:?}", other),
        }
    }
}
