//! Defines the [SignatureStroke] struct, one continuous pen movement of a freehand signature,
//! and the rasterizer that bakes strokes onto a capture canvas.
//!
//! # Coordinate System
//!
//! Stroke points are in canvas pixels:
//! - Origin (0, 0) is at the top-left corner of the canvas
//! - X increases to the right
//! - Y increases downward
//!
//! Points outside the canvas are accepted and simply clipped when drawn.

use image::{Rgba, RgbaImage};

/// The default ink color: a dark blue, like a ballpoint pen.
pub const DEFAULT_INK_COLOR: Rgba<u8> = Rgba([20, 30, 90, 255]);

/// The default stroke width, in pixels.
pub const DEFAULT_STROKE_WIDTH: f32 = 2.5;

/// A single sampled pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
}

impl StrokePoint {
    /// Creates a new point with the given coordinates.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A single stroke in a signature, representing one continuous pen movement.
///
/// A typical handwritten signature consists of multiple strokes - each time the pointer is
/// lifted and put back down starts a new stroke. A stroke is a polyline through its sampled
/// points; a stroke with a single point (a tap) draws a dot.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureStroke {
    points: Vec<StrokePoint>,
    stroke_width: f32,
    stroke_color: Rgba<u8>,
}

impl Default for SignatureStroke {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureStroke {
    /// Creates a new empty stroke with default styling.
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            stroke_color: DEFAULT_INK_COLOR,
        }
    }

    /// Sets the stroke width in pixels. Widths below one pixel are raised to one.
    pub fn with_stroke_width(mut self, width: f32) -> Self {
        self.stroke_width = width.max(1.0);
        self
    }

    /// Sets the stroke color.
    pub fn with_color(mut self, color: Rgba<u8>) -> Self {
        self.stroke_color = color;
        self
    }

    /// Appends a sampled point to this stroke.
    pub fn line_to(mut self, x: f32, y: f32) -> Self {
        self.push(StrokePoint::new(x, y));
        self
    }

    /// Appends a sampled point to this stroke in place.
    #[inline]
    pub fn push(&mut self, point: StrokePoint) {
        self.points.push(point);
    }

    /// Returns the sampled points of this stroke.
    #[inline]
    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    #[inline]
    pub fn last_point(&self) -> Option<StrokePoint> {
        self.points.last().copied()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    #[inline]
    pub fn stroke_color(&self) -> Rgba<u8> {
        self.stroke_color
    }

    /// Rasterizes this whole stroke onto `target`.
    pub fn draw_onto(&self, target: &mut RgbaImage) {
        match self.points.as_slice() {
            [] => {}
            [only] => self.draw_segment(target, *only, *only),
            points => {
                for pair in points.windows(2) {
                    self.draw_segment(target, pair[0], pair[1]);
                }
            }
        }
    }

    /// Rasterizes the single segment `from -> to` of this stroke onto `target`. Used to draw
    /// live ink while the pointer is still down.
    pub fn draw_segment(&self, target: &mut RgbaImage, from: StrokePoint, to: StrokePoint) {
        let half_width = (self.stroke_width / 2.0).ceil() as i32;

        draw_thick_line(target, from, to, half_width, self.stroke_color);
    }
}

/// Draws a thick line on the bitmap using filled circle stamps along its length.
fn draw_thick_line(
    target: &mut RgbaImage,
    from: StrokePoint,
    to: StrokePoint,
    half_width: i32,
    ink: Rgba<u8>,
) {
    let width = target.width() as i32;
    let height = target.height() as i32;

    // Only the part of the segment whose stamps can reach the bitmap is walked.
    let reach = half_width as f32;
    let bounds = (-reach, -reach, width as f32 - 1.0 + reach, height as f32 - 1.0 + reach);

    let Some((from, to)) = clip_segment(from, to, bounds) else {
        return;
    };

    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = (dx * dx + dy * dy).sqrt();
    let steps = (len * 2.0).max(1.0) as i32;

    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let px = (from.x + dx * t).round() as i32;
        let py = (from.y + dy * t).round() as i32;

        for oy in -half_width..=half_width {
            for ox in -half_width..=half_width {
                if ox * ox + oy * oy > half_width * half_width {
                    continue;
                }

                let x = px + ox;
                let y = py + oy;

                if x >= 0 && x < width && y >= 0 && y < height {
                    target.put_pixel(x as u32, y as u32, ink);
                }
            }
        }
    }
}

/// Clips the segment `from -> to` to the rectangle `(min_x, min_y, max_x, max_y)` using the
/// Liang-Barsky parametric test. Returns `None` if no part of the segment lies inside, or if
/// either end point is not finite.
fn clip_segment(
    from: StrokePoint,
    to: StrokePoint,
    (min_x, min_y, max_x, max_y): (f32, f32, f32, f32),
) -> Option<(StrokePoint, StrokePoint)> {
    if ![from.x, from.y, to.x, to.y].iter().all(|value| value.is_finite()) {
        return None;
    }

    let dx = to.x - from.x;
    let dy = to.y - from.y;

    let (mut t0, mut t1) = (0.0f32, 1.0f32);

    for (p, q) in [
        (-dx, from.x - min_x),
        (dx, max_x - from.x),
        (-dy, from.y - min_y),
        (dy, max_y - from.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let t = q / p;

            if p < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }

            if t0 > t1 {
                return None;
            }
        }
    }

    Some((
        StrokePoint::new(from.x + dx * t0, from.y + dy * t0),
        StrokePoint::new(from.x + dx * t1, from.y + dy * t1),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_stroke_builder() {
        let stroke = SignatureStroke::new()
            .with_stroke_width(0.2)
            .with_color(Rgba([0, 0, 0, 255]))
            .line_to(10.0, 20.0)
            .line_to(30.0, 40.0);

        assert_eq!(stroke.stroke_width(), 1.0);
        assert_eq!(stroke.points().len(), 2);
        assert_eq!(stroke.last_point(), Some(StrokePoint::new(30.0, 40.0)));
    }

    #[test]
    fn test_draw_onto_covers_the_polyline() {
        let mut image = RgbaImage::new(100, 50);
        let stroke = SignatureStroke::new().line_to(10.0, 10.0).line_to(90.0, 10.0);

        stroke.draw_onto(&mut image);

        assert_eq!(*image.get_pixel(10, 10), DEFAULT_INK_COLOR);
        assert_eq!(*image.get_pixel(50, 10), DEFAULT_INK_COLOR);
        assert_eq!(*image.get_pixel(90, 10), DEFAULT_INK_COLOR);
        assert_eq!(image.get_pixel(50, 40)[3], 0);
    }

    #[test]
    fn test_single_point_draws_a_dot_and_clips() {
        let mut image = RgbaImage::new(20, 20);

        SignatureStroke::new().line_to(0.0, 0.0).draw_onto(&mut image);
        assert_eq!(*image.get_pixel(0, 0), DEFAULT_INK_COLOR);

        let mut image = RgbaImage::new(20, 20);
        SignatureStroke::new()
            .line_to(-50.0, -50.0)
            .line_to(-40.0, -50.0)
            .draw_onto(&mut image);
        assert!(image.pixels().all(|pixel| pixel[3] == 0));
    }

    #[test]
    fn test_far_out_segment_is_clipped_to_the_bitmap() {
        let mut image = RgbaImage::new(100, 50);

        SignatureStroke::new()
            .line_to(-1.0e7, 10.0)
            .line_to(1.0e7, 10.0)
            .draw_onto(&mut image);

        assert_eq!(*image.get_pixel(0, 10), DEFAULT_INK_COLOR);
        assert_eq!(*image.get_pixel(50, 10), DEFAULT_INK_COLOR);
        assert_eq!(*image.get_pixel(99, 10), DEFAULT_INK_COLOR);
        assert_eq!(image.get_pixel(50, 40)[3], 0);
    }

    #[test]
    fn test_clip_segment() {
        let bounds = (0.0, 0.0, 99.0, 49.0);

        let (from, to) =
            clip_segment(StrokePoint::new(-100.0, 10.0), StrokePoint::new(200.0, 10.0), bounds)
                .unwrap();
        assert!(from.x.abs() < 1e-3 && (to.x - 99.0).abs() < 1e-3);
        assert_eq!((from.y, to.y), (10.0, 10.0));
        assert_eq!(
            clip_segment(StrokePoint::new(5.0, 5.0), StrokePoint::new(5.0, 5.0), bounds),
            Some((StrokePoint::new(5.0, 5.0), StrokePoint::new(5.0, 5.0)))
        );
        assert_eq!(
            clip_segment(StrokePoint::new(-10.0, -10.0), StrokePoint::new(-1.0, 60.0), bounds),
            None
        );
        assert_eq!(
            clip_segment(StrokePoint::new(f32::NAN, 5.0), StrokePoint::new(5.0, 5.0), bounds),
            None
        );
    }
}
