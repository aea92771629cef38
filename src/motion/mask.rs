//! Binary motion-mask construction.
//!
//! The stages between two blurred luminance images and a gate
//! decision: absolute differencing, fixed-threshold binarization,
//! dilation to merge fragments, and a connected-region area scan.

use image::{GrayImage, Luma};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::map::map_colors2;
use imageproc::morphology::dilate;
use imageproc::region_labelling::{connected_components, Connectivity};

/// Per-pixel absolute difference of two equally sized luminance images.
pub fn absolute_difference(a: &GrayImage, b: &GrayImage) -> GrayImage {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    map_colors2(a, b, |p, q| Luma([p[0].abs_diff(q[0])]))
}

/// Binarizes a difference image at the given intensity cutoff.
///
/// Pixels strictly above the cutoff become foreground (255).
pub fn binarize(diff: &GrayImage, cutoff: u8) -> GrayImage {
    threshold(diff, cutoff, ThresholdType::Binary)
}

/// Dilates the mask to merge nearby fragments.
pub fn dilate_mask(mask: &GrayImage, radius: u8) -> GrayImage {
    if radius == 0 {
        return mask.clone();
    }
    dilate(mask, Norm::LInf, radius)
}

/// Returns true if any 8-connected foreground region covers more than
/// `min_area` pixels.
///
/// Accumulates per-label areas while scanning and stops at the first
/// qualifying region; the exact region count is never needed, only
/// the yes/no gate.
pub fn has_region_larger_than(mask: &GrayImage, min_area: u32) -> bool {
    let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));

    let mut areas: Vec<u32> = Vec::new();
    for label in labels.pixels() {
        let id = label[0];
        if id == 0 {
            continue; // background
        }
        let idx = (id - 1) as usize;
        if areas.len() <= idx {
            areas.resize(idx + 1, 0);
        }
        areas[idx] += 1;
        if areas[idx] > min_area {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(width: u32, height: u32) -> GrayImage {
        GrayImage::new(width, height)
    }

    /// Paints a filled horizontal run of foreground pixels.
    fn paint_run(mask: &mut GrayImage, x0: u32, y: u32, len: u32) {
        for x in x0..x0 + len {
            mask.put_pixel(x, y, Luma([255]));
        }
    }

    #[test]
    fn test_absolute_difference_symmetric() {
        let a = GrayImage::from_pixel(4, 4, Luma([30]));
        let b = GrayImage::from_pixel(4, 4, Luma([80]));

        assert!(absolute_difference(&a, &b).pixels().all(|p| p[0] == 50));
        assert!(absolute_difference(&b, &a).pixels().all(|p| p[0] == 50));
    }

    #[test]
    fn test_binarize_cutoff() {
        let mut diff = blank(3, 1);
        diff.put_pixel(0, 0, Luma([10]));
        diff.put_pixel(1, 0, Luma([25]));
        diff.put_pixel(2, 0, Luma([26]));

        let binary = binarize(&diff, 25);
        assert_eq!(binary.get_pixel(0, 0)[0], 0);
        assert_eq!(binary.get_pixel(1, 0)[0], 0); // at the cutoff, not above
        assert_eq!(binary.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn test_dilation_merges_fragments() {
        let mut mask = blank(16, 16);
        mask.put_pixel(4, 8, Luma([255]));
        mask.put_pixel(7, 8, Luma([255])); // 3 pixels apart

        // Without dilation: two regions of area 1
        assert!(!has_region_larger_than(&mask, 1));

        // Radius-2 dilation bridges the gap into one region
        let dilated = dilate_mask(&mask, 2);
        assert!(has_region_larger_than(&dilated, 10));
    }

    #[test]
    fn test_area_just_above_threshold_fires() {
        let mut mask = blank(600, 4);
        paint_run(&mut mask, 10, 2, 501);
        assert!(has_region_larger_than(&mask, 500));
    }

    #[test]
    fn test_area_just_below_threshold_quiet() {
        let mut mask = blank(600, 4);
        paint_run(&mut mask, 10, 2, 499);
        assert!(!has_region_larger_than(&mask, 500));
    }

    #[test]
    fn test_area_at_threshold_quiet() {
        let mut mask = blank(600, 4);
        paint_run(&mut mask, 10, 2, 500);
        assert!(!has_region_larger_than(&mask, 500));
    }

    #[test]
    fn test_disjoint_regions_not_summed() {
        // Two regions of 300 pixels each, far apart: neither exceeds
        // 500 alone and their total must not count.
        let mut mask = blank(600, 8);
        paint_run(&mut mask, 0, 1, 300);
        paint_run(&mut mask, 0, 6, 300);
        assert!(!has_region_larger_than(&mask, 500));
    }

    #[test]
    fn test_empty_mask_quiet() {
        assert!(!has_region_larger_than(&blank(64, 64), 0));
    }
}
