//! Frame type representing a captured image with metadata.

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use std::time::Instant;

/// A single captured frame from the camera.
///
/// Wraps the RGB raster along with metadata needed for cooldown
/// bookkeeping and debugging. Frames are ephemeral: the loop owns at
/// most one at a time, and only the motion gate's grayscale reference
/// outlives an iteration.
#[derive(Clone)]
pub struct Frame {
    /// RGB pixel data.
    image: RgbImage,
    /// Capture timestamp.
    timestamp: Instant,
    /// Monotonic sequence number.
    sequence: u64,
}

impl Frame {
    /// Creates a new frame from a decoded RGB image.
    pub fn new(image: RgbImage, sequence: u64) -> Self {
        Self {
            image,
            timestamp: Instant::now(),
            sequence,
        }
    }

    /// Returns a reference to the RGB raster.
    #[inline]
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Returns a mutable reference to the RGB raster.
    #[inline]
    pub fn image_mut(&mut self) -> &mut RgbImage {
        &mut self.image
    }

    /// Consumes the frame, returning the raster.
    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Returns the capture timestamp.
    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Replaces the raster while keeping the capture metadata.
    ///
    /// Used when a processed variant (e.g. low-light enhanced) stands
    /// in for the frame as captured.
    pub fn with_image(&self, image: RgbImage) -> Self {
        Self {
            image,
            timestamp: self.timestamp,
            sequence: self.sequence,
        }
    }

    /// Resamples to the canonical processing dimensions.
    ///
    /// Devices are free to ignore resolution hints, so every captured
    /// frame passes through here before any other stage sees it.
    pub fn resized(&self, width: u32, height: u32) -> Self {
        if self.image.dimensions() == (width, height) {
            return self.clone();
        }
        let resized = imageops::resize(&self.image, width, height, FilterType::Triangle);
        self.with_image(resized)
    }

    /// Converts to single-channel luminance.
    pub fn to_luma(&self) -> GrayImage {
        imageops::grayscale(&self.image)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("sequence", &self.sequence)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_frame_creation() {
        let image = RgbImage::new(640, 480);
        let frame = Frame::new(image, 1);

        assert_eq!(frame.width(), 640);
        assert_eq!(frame.height(), 480);
        assert_eq!(frame.sequence(), 1);
    }

    #[test]
    fn test_resize_to_canonical() {
        let image = RgbImage::new(1280, 720);
        let frame = Frame::new(image, 3);

        let resized = frame.resized(640, 480);
        assert_eq!(resized.width(), 640);
        assert_eq!(resized.height(), 480);
        assert_eq!(resized.sequence(), 3);
    }

    #[test]
    fn test_resize_noop_at_target_dimensions() {
        let image = RgbImage::from_pixel(640, 480, Rgb([7, 7, 7]));
        let frame = Frame::new(image, 1);

        let resized = frame.resized(640, 480);
        assert_eq!(resized.image(), frame.image());
    }

    #[test]
    fn test_with_image_keeps_metadata() {
        let frame = Frame::new(RgbImage::new(64, 48), 9);
        let replaced = frame.with_image(RgbImage::from_pixel(64, 48, Rgb([1, 2, 3])));

        assert_eq!(replaced.sequence(), 9);
        assert_eq!(replaced.timestamp(), frame.timestamp());
    }

    #[test]
    fn test_to_luma_dimensions() {
        let frame = Frame::new(RgbImage::new(64, 48), 1);
        let gray = frame.to_luma();

        assert_eq!(gray.dimensions(), (64, 48));
    }
}
