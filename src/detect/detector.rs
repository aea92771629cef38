//! Person-detector capability.
//!
//! The monitor treats detection as a capability: given a frame and a
//! confidence threshold, return the boxes believed to contain a
//! person. Inference engines live behind this trait so the pipeline
//! can run against a deterministic stub, and so the expensive engine
//! is only consulted when the motion gate fires.

use super::BoundingBox;
use image::RgbImage;
use std::collections::VecDeque;
use thiserror::Error;

/// Errors from a detector implementation.
#[derive(Debug, Error)]
pub enum DetectorError {
    /// The model failed to initialize. Fatal at startup.
    #[error("failed to load detection model: {0}")]
    ModelLoad(String),
    /// A single inference call failed. Isolated to its iteration.
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Trait for person-detector implementations.
pub trait PersonDetector {
    /// Returns person boxes with confidence above `confidence`.
    ///
    /// Invoked at irregular, motion-gated intervals rather than per
    /// frame; implementations must not assume a steady cadence.
    fn detect(
        &mut self,
        image: &RgbImage,
        confidence: f32,
    ) -> Result<Vec<BoundingBox>, DetectorError>;
}

/// Deterministic detector stub for tests and demos.
///
/// Pops scripted responses in order and returns no detections once
/// the script runs dry. Records how it was called so tests can assert
/// the gate actually spared the expensive path, and what it was
/// called with so tests can pin down which frame variant fed it.
#[derive(Debug, Default)]
pub struct ScriptedDetector {
    script: VecDeque<Vec<BoundingBox>>,
    calls: u64,
    last_input_mean: Option<f64>,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the response for the next `detect` call.
    pub fn push_response(&mut self, boxes: Vec<BoundingBox>) {
        self.script.push_back(boxes);
    }

    /// Number of times `detect` has been invoked.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Mean luminance of the most recent frame given to `detect`.
    pub fn last_input_mean(&self) -> Option<f64> {
        self.last_input_mean
    }
}

impl PersonDetector for ScriptedDetector {
    fn detect(
        &mut self,
        image: &RgbImage,
        _confidence: f32,
    ) -> Result<Vec<BoundingBox>, DetectorError> {
        self.calls += 1;

        let gray = image::imageops::grayscale(image);
        let pixels = gray.as_raw();
        if !pixels.is_empty() {
            let sum: u64 = pixels.iter().map(|&v| u64::from(v)).sum();
            self.last_input_mean = Some(sum as f64 / pixels.len() as f64);
        }

        Ok(self.script.pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_responses_in_order() {
        let mut detector = ScriptedDetector::new();
        detector.push_response(vec![BoundingBox::new(0, 0, 10, 10)]);
        detector.push_response(vec![]);

        let image = RgbImage::new(16, 16);
        assert_eq!(detector.detect(&image, 0.5).unwrap().len(), 1);
        assert!(detector.detect(&image, 0.5).unwrap().is_empty());
    }

    #[test]
    fn test_exhausted_script_returns_nothing() {
        let mut detector = ScriptedDetector::new();
        let image = RgbImage::new(16, 16);

        assert!(detector.detect(&image, 0.5).unwrap().is_empty());
        assert_eq!(detector.calls(), 1);
    }

    #[test]
    fn test_records_input_luminance() {
        let mut detector = ScriptedDetector::new();
        let image = RgbImage::from_pixel(8, 8, image::Rgb([40, 40, 40]));

        detector.detect(&image, 0.5).unwrap();
        let mean = detector.last_input_mean().unwrap();
        assert!((mean - 40.0).abs() < 1.0);
    }
}
