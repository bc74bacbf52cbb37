use headcount_common::Prediction;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const STROKE_WIDTH: u32 = 2;

/// Inclusive pixel corners of a prediction box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxCorners {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoxCorners {
    pub fn width(&self) -> u32 {
        span(self.left, self.right)
    }

    pub fn height(&self) -> u32 {
        span(self.top, self.bottom)
    }

    /// Pull every corner to just outside the frame. Edges beyond the frame
    /// stay invisible and the drawing arithmetic stays small.
    pub fn clip_to(&self, (width, height): (u32, u32)) -> BoxCorners {
        let margin = STROKE_WIDTH as i64;
        let clip = |v: i32, extent: u32| (v as i64).clamp(-margin, extent as i64 + margin) as i32;
        BoxCorners {
            left: clip(self.left, width),
            top: clip(self.top, height),
            right: clip(self.right, width),
            bottom: clip(self.bottom, height),
        }
    }
}

fn span(start: i32, end: i32) -> u32 {
    (end as i64 - start as i64 + 1).clamp(1, u32::MAX as i64) as u32
}

/// Truncates toward zero, the same way the service's own overlays do.
pub fn box_corners(prediction: &Prediction) -> BoxCorners {
    let ((x1, y1), (x2, y2)) = prediction.corners();
    BoxCorners {
        left: x1 as i32,
        top: y1 as i32,
        right: x2 as i32,
        bottom: y2 as i32,
    }
}

/// Draw one box per prediction. Boxes are clipped to the frame.
pub fn annotate(mut frame: RgbImage, predictions: &[Prediction]) -> RgbImage {
    for prediction in predictions {
        let corners = box_corners(prediction).clip_to(frame.dimensions());
        // stroke grows inward from the outer edge
        for inset in 0..STROKE_WIDTH {
            let width = corners.width().saturating_sub(2 * inset);
            let height = corners.height().saturating_sub(2 * inset);
            if width == 0 || height == 0 {
                break;
            }
            let rect = Rect::at(corners.left + inset as i32, corners.top + inset as i32)
                .of_size(width, height);
            draw_hollow_rect_mut(&mut frame, rect, BOX_COLOR);
        }
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(x: f32, y: f32, width: f32, height: f32) -> Prediction {
        Prediction {
            x,
            y,
            width,
            height,
            class_label: "head".into(),
            confidence: 0.8,
        }
    }

    #[test]
    fn test_box_corners() {
        let corners = box_corners(&prediction(50.0, 50.0, 20.0, 10.0));
        assert_eq!(
            corners,
            BoxCorners { left: 40, top: 45, right: 60, bottom: 55 }
        );
        assert_eq!((corners.width(), corners.height()), (21, 11));
    }

    #[test]
    fn test_box_corners_truncate() {
        let corners = box_corners(&prediction(10.7, 10.2, 5.0, 3.0));
        assert_eq!(
            corners,
            BoxCorners { left: 8, top: 8, right: 13, bottom: 11 }
        );
    }

    #[test]
    fn test_degenerate_box_does_not_panic() {
        let frame = RgbImage::new(16, 16);
        let out = annotate(frame, &[prediction(8.0, 8.0, 0.0, -4.0)]);
        assert_eq!(out.dimensions(), (16, 16));
    }

    #[test]
    fn test_huge_box_does_not_overflow() {
        let corners = box_corners(&prediction(0.0, 0.0, 1.0e10, 4.0));
        assert_eq!((corners.left, corners.right), (i32::MIN, i32::MAX));
        assert_eq!(corners.width(), u32::MAX);

        let out = annotate(RgbImage::new(32, 32), &[prediction(0.0, 0.0, 1.0e10, 4.0)]);
        // only the bottom edge lands inside the frame
        assert_eq!(*out.get_pixel(16, 2), BOX_COLOR);
        assert_eq!(*out.get_pixel(16, 1), BOX_COLOR);
        assert_eq!(*out.get_pixel(16, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_clip_keeps_boxes_inside_frame() {
        let corners = BoxCorners { left: 4, top: 5, right: 20, bottom: 12 };
        assert_eq!(corners.clip_to((32, 32)), corners);

        let wide = BoxCorners { left: -500, top: 3, right: 900, bottom: 40 };
        assert_eq!(
            wide.clip_to((32, 32)),
            BoxCorners { left: -2, top: 3, right: 34, bottom: 34 }
        );
    }

    #[test]
    fn test_box_partly_outside_frame_is_clipped() {
        let frame = RgbImage::new(32, 32);
        let out = annotate(frame, &[prediction(0.0, 0.0, 20.0, 20.0)]);
        assert_eq!(*out.get_pixel(9, 0), BOX_COLOR);
        assert_eq!(*out.get_pixel(0, 9), BOX_COLOR);
    }
}
