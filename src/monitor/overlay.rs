//! Status overlay drawing.
//!
//! Annotates the frame variant selected for this iteration with a
//! status border tint and person boxes. Pushing pixels to an actual
//! window is left to the embedder; this module only marks up the
//! raster.

use crate::detect::BoundingBox;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

/// What the monitor believes is happening right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorStatus {
    /// Quiet scene.
    Monitoring,
    /// Motion without a confirmed person.
    MotionDetected,
    /// Persons in frame.
    PersonAlert(usize),
}

const MONITOR_GREEN: Rgb<u8> = Rgb([0, 200, 0]);
const MOTION_BLUE: Rgb<u8> = Rgb([60, 120, 255]);
const ALERT_RED: Rgb<u8> = Rgb([255, 40, 40]);

/// Thickness of the status border, in pixels.
const BORDER_PX: u32 = 3;
/// Thickness of person box outlines, in pixels.
const BOX_PX: u32 = 2;

impl MonitorStatus {
    /// Border tint used when annotating the frame.
    pub fn color(&self) -> Rgb<u8> {
        match self {
            MonitorStatus::Monitoring => MONITOR_GREEN,
            MonitorStatus::MotionDetected => MOTION_BLUE,
            MonitorStatus::PersonAlert(_) => ALERT_RED,
        }
    }
}

/// Draws the status border and any person boxes in place.
pub fn annotate(image: &mut RgbImage, status: MonitorStatus, boxes: &[BoundingBox]) {
    let (width, height) = image.dimensions();

    for inset in 0..BORDER_PX {
        if width <= 2 * inset + 1 || height <= 2 * inset + 1 {
            break;
        }
        let rect = Rect::at(inset as i32, inset as i32)
            .of_size(width - 2 * inset, height - 2 * inset);
        draw_hollow_rect_mut(image, rect, status.color());
    }

    for bbox in boxes {
        let Some(bbox) = bbox.clamped(width, height) else {
            continue;
        };
        for inset in 0..BOX_PX {
            let w = bbox.width().saturating_sub(2 * inset);
            let h = bbox.height().saturating_sub(2 * inset);
            if w == 0 || h == 0 {
                break;
            }
            let rect = Rect::at((bbox.x1 + inset) as i32, (bbox.y1 + inset) as i32).of_size(w, h);
            draw_hollow_rect_mut(image, rect, ALERT_RED);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_tint_applied() {
        let mut image = RgbImage::new(64, 48);
        annotate(&mut image, MonitorStatus::Monitoring, &[]);

        assert_eq!(*image.get_pixel(0, 0), MONITOR_GREEN);
        assert_eq!(*image.get_pixel(63, 47), MONITOR_GREEN);
    }

    #[test]
    fn test_person_box_drawn() {
        let mut image = RgbImage::new(64, 48);
        let boxes = [BoundingBox::new(10, 10, 30, 40)];
        annotate(&mut image, MonitorStatus::PersonAlert(1), &boxes);

        assert_eq!(*image.get_pixel(10, 10), ALERT_RED);
        assert_eq!(*image.get_pixel(10, 25), ALERT_RED);
        // Interior untouched
        assert_eq!(*image.get_pixel(20, 25), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_out_of_frame_box_ignored() {
        let mut image = RgbImage::new(64, 48);
        let boxes = [BoundingBox::new(100, 100, 200, 200)];
        annotate(&mut image, MonitorStatus::PersonAlert(1), &boxes);
    }

    #[test]
    fn test_tiny_image_no_panic() {
        let mut image = RgbImage::new(2, 2);
        annotate(&mut image, MonitorStatus::MotionDetected, &[]);
    }
}
