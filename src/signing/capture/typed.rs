//! Defines the [TypeFace] trait, the seam through which typed signatures are rendered, and
//! [TrueTypeFace], its implementation over TrueType/OpenType font data.

use image::{GrayImage, Luma, Rgba};
use rusttype::{point, Font, Scale};
use std::fmt::{Debug, Formatter};

use crate::error::CaptureError;
use crate::signing::capture::canvas::CaptureCanvas;

/// A decorative font a signer can choose for a typed signature.
pub trait TypeFace: Send + Sync + Debug {
    /// Returns the display name of this font, as offered to the signer.
    fn name(&self) -> &str;

    /// Renders a single line of `text` at `px_size` pixels into a coverage mask tightly
    /// bounding the inked glyphs (0 = no ink, 255 = full ink). Returns `None` if the text
    /// produces no visible glyphs.
    fn rasterize(&self, text: &str, px_size: f32) -> Option<GrayImage>;
}

/// A [TypeFace] backed by TrueType or OpenType font data.
pub struct TrueTypeFace {
    name: String,
    font: Font<'static>,
}

impl TrueTypeFace {
    /// Parses font data into a new [TrueTypeFace].
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Result<Self, CaptureError> {
        let name = name.into();

        match Font::try_from_vec(data) {
            Some(font) => Ok(Self { name, font }),
            None => Err(CaptureError::InvalidFont(name)),
        }
    }
}

impl Debug for TrueTypeFace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrueTypeFace")
            .field("name", &self.name)
            .finish()
    }
}

impl TypeFace for TrueTypeFace {
    fn name(&self) -> &str {
        &self.name
    }

    fn rasterize(&self, text: &str, px_size: f32) -> Option<GrayImage> {
        let scale = Scale::uniform(px_size);
        let ascent = self.font.v_metrics(scale).ascent;

        let glyphs: Vec<_> = self
            .font
            .layout(text, scale, point(0.0, ascent))
            .collect();

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (i32::MAX, i32::MAX, i32::MIN, i32::MIN);

        for bb in glyphs.iter().filter_map(|glyph| glyph.pixel_bounding_box()) {
            min_x = min_x.min(bb.min.x);
            min_y = min_y.min(bb.min.y);
            max_x = max_x.max(bb.max.x);
            max_y = max_y.max(bb.max.y);
        }

        if min_x >= max_x || min_y >= max_y {
            return None;
        }

        let width = (max_x - min_x) as u32;
        let height = (max_y - min_y) as u32;
        let mut mask = GrayImage::new(width, height);

        for glyph in &glyphs {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, coverage| {
                    let x = bb.min.x + gx as i32 - min_x;
                    let y = bb.min.y + gy as i32 - min_y;

                    if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                        let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                        let pixel = mask.get_pixel_mut(x as u32, y as u32);
                        pixel.0[0] = pixel.0[0].max(value);
                    }
                });
            }
        }

        Some(mask)
    }
}

/// Paints a coverage `mask` onto the canvas ink layer in `color`, centred horizontally and
/// vertically. Parts of the mask that fall outside the canvas are clipped.
pub(crate) fn draw_centered(canvas: &mut CaptureCanvas, mask: &GrayImage, color: Rgba<u8>) {
    let offset_x = (canvas.width() as i64 - mask.width() as i64) / 2;
    let offset_y = (canvas.height() as i64 - mask.height() as i64) / 2;
    let (width, height) = (canvas.width() as i64, canvas.height() as i64);
    let ink = canvas.ink_mut();

    for (mx, my, Luma([coverage])) in mask.enumerate_pixels() {
        if *coverage == 0 {
            continue;
        }

        let x = mx as i64 + offset_x;
        let y = my as i64 + offset_y;

        if x < 0 || y < 0 || x >= width || y >= height {
            continue;
        }

        let alpha = (u16::from(color[3]) * u16::from(*coverage) / 255) as u8;

        ink.put_pixel(x as u32, y as u32, Rgba([color[0], color[1], color[2], alpha]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_font_data_is_rejected() {
        let result = TrueTypeFace::from_bytes("Broken Script", b"not a font".to_vec());

        assert!(matches!(result, Err(CaptureError::InvalidFont(name)) if name == "Broken Script"));
    }

    #[test]
    fn test_draw_centered_places_mask_in_the_middle() {
        let mut canvas = CaptureCanvas::new(100, 50);
        let mask = GrayImage::from_pixel(10, 10, Luma([255]));

        draw_centered(&mut canvas, &mask, Rgba([0, 0, 0, 255]));

        assert_eq!(canvas.ink().get_pixel(45, 20)[3], 255);
        assert_eq!(canvas.ink().get_pixel(54, 29)[3], 255);
        assert_eq!(canvas.ink().get_pixel(44, 20)[3], 0);
        assert_eq!(canvas.ink().get_pixel(55, 20)[3], 0);
    }

    #[test]
    fn test_draw_centered_clips_oversized_mask() {
        let mut canvas = CaptureCanvas::new(20, 10);
        let mask = GrayImage::from_pixel(40, 10, Luma([128]));

        draw_centered(&mut canvas, &mask, Rgba([0, 0, 0, 255]));

        assert!(canvas.ink().pixels().all(|pixel| pixel[3] == 128));
    }
}
