//! Low-light classification and enhancement.
//!
//! Dim scenes get a localized contrast boost before detection. The
//! substitution is total: whichever variant this module selects is the
//! one the detector sees and the one the snapshot throttle persists,
//! so stored evidence always matches the detection rationale.

mod clahe;

pub use clahe::equalize;

use crate::capture::Frame;
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

/// Scene brightness classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Illumination {
    /// Ambient light is adequate; the raw frame is used as-is.
    Normal,
    /// Mean luminance fell below the cutoff; the enhanced variant
    /// substitutes for the raw frame.
    LowLight,
}

/// Illumination adapter tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IlluminationConfig {
    /// Mean-luminance cutoff below which a frame counts as low-light.
    pub brightness_threshold: f64,
    /// CLAHE clip limit.
    pub clip_limit: f64,
    /// CLAHE tile grid (grid × grid).
    pub tile_grid: u32,
}

impl Default for IlluminationConfig {
    fn default() -> Self {
        Self {
            brightness_threshold: 60.0,
            clip_limit: 2.0,
            tile_grid: 8,
        }
    }
}

/// Classifies frames by brightness and produces the enhanced variant
/// for dim scenes.
pub struct IlluminationAdapter {
    config: IlluminationConfig,
}

impl IlluminationAdapter {
    /// Creates an adapter with the given tuning.
    pub fn new(config: IlluminationConfig) -> Self {
        Self { config }
    }

    /// Mean luminance over the whole frame.
    pub fn mean_luminance(frame: &Frame) -> f64 {
        let gray = frame.to_luma();
        let pixels = gray.as_raw();
        if pixels.is_empty() {
            return 0.0;
        }
        pixels.iter().map(|&v| u64::from(v)).sum::<u64>() as f64 / pixels.len() as f64
    }

    /// Classifies the frame's ambient brightness.
    pub fn classify(&self, frame: &Frame) -> Illumination {
        if Self::mean_luminance(frame) < self.config.brightness_threshold {
            Illumination::LowLight
        } else {
            Illumination::Normal
        }
    }

    /// Applies the luminance-only contrast boost.
    ///
    /// The frame moves into a luminance/chrominance space (BT.601
    /// YCbCr), CLAHE runs on the luminance plane alone, and the
    /// untouched chrominance recombines with it on the way back to
    /// RGB. Boosting luminance only avoids shifting colors.
    pub fn enhance(&self, frame: &Frame) -> Frame {
        let rgb = frame.image();
        let (width, height) = rgb.dimensions();

        let mut luma = image::GrayImage::new(width, height);
        let mut cb = vec![0.0f32; (width * height) as usize];
        let mut cr = vec![0.0f32; (width * height) as usize];

        for (i, (pixel, plane)) in rgb.pixels().zip(luma.pixels_mut()).enumerate() {
            let [r, g, b] = pixel.0;
            let (r, g, b) = (f32::from(r), f32::from(g), f32::from(b));
            let y = 0.299 * r + 0.587 * g + 0.114 * b;
            cb[i] = 128.0 - 0.168_736 * r - 0.331_264 * g + 0.5 * b;
            cr[i] = 128.0 + 0.5 * r - 0.418_688 * g - 0.081_312 * b;
            plane.0[0] = y.round().clamp(0.0, 255.0) as u8;
        }

        let boosted = clahe::equalize(&luma, self.config.clip_limit, self.config.tile_grid);

        let mut out = RgbImage::new(width, height);
        for (i, pixel) in out.pixels_mut().enumerate() {
            let y = f32::from(boosted.as_raw()[i]);
            let (cb, cr) = (cb[i] - 128.0, cr[i] - 128.0);
            let r = y + 1.402 * cr;
            let g = y - 0.344_136 * cb - 0.714_136 * cr;
            let b = y + 1.772 * cb;
            *pixel = Rgb([
                r.round().clamp(0.0, 255.0) as u8,
                g.round().clamp(0.0, 255.0) as u8,
                b.round().clamp(0.0, 255.0) as u8,
            ]);
        }

        frame.with_image(out)
    }

    /// Classifies and, when low-light, substitutes the enhanced
    /// variant. The returned frame is the one the rest of the
    /// iteration must use for detection and persistence.
    pub fn adapt(&self, frame: &Frame) -> (Frame, Illumination) {
        match self.classify(frame) {
            Illumination::LowLight => {
                tracing::debug!("low light, enhancing luminance");
                (self.enhance(frame), Illumination::LowLight)
            }
            Illumination::Normal => (frame.clone(), Illumination::Normal),
        }
    }
}
