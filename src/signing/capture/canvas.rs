//! Defines the [CaptureCanvas] struct, the fixed-size raster a signature is captured onto,
//! and the [CapturedImage] struct, the encoded raster handed to the rest of the engine.
//!
//! The canvas keeps the signer's ink on its own transparent layer. The dashed baseline
//! guideline is composed in only when a snapshot is taken, so the guideline is always part of
//! the emitted image but never counts as captured content.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Pixel, Rgba, RgbaImage};
use std::io::Cursor;

use crate::error::CaptureError;

const GUIDELINE_COLOR: Rgba<u8> = Rgba([156, 163, 175, 255]);

const GUIDELINE_DASH: u32 = 6;

const GUIDELINE_GAP: u32 = 4;

/// Vertical position of the baseline guideline, as a fraction of the canvas height.
const GUIDELINE_POSITION: f32 = 0.75;

/// Horizontal inset of the baseline guideline, as a fraction of the canvas width.
const GUIDELINE_INSET: f32 = 0.05;

/// A single encoded raster image of a signature or initials capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    png: Bytes,
    width: u32,
    height: u32,
}

impl CapturedImage {
    /// Wraps already-encoded PNG data.
    #[inline]
    pub fn from_png(png: Bytes, width: u32, height: u32) -> Self {
        Self { png, width, height }
    }

    /// Returns the encoded PNG bytes.
    #[inline]
    pub fn png(&self) -> &Bytes {
        &self.png
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns this image as a `data:image/png;base64,...` URL, the form accepted by the
    /// signing endpoint and by image elements in the host page.
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", BASE64.encode(&self.png))
    }

    /// Decodes this image back into pixels.
    pub fn decode(&self) -> Result<RgbaImage, CaptureError> {
        image::load_from_memory_with_format(&self.png, ImageFormat::Png)
            .map(|image| image.to_rgba8())
            .map_err(CaptureError::InvalidImage)
    }
}

/// A fixed-size capture surface. One canvas is owned by one field's capture session.
#[derive(Debug, Clone)]
pub struct CaptureCanvas {
    ink: RgbaImage,
}

impl CaptureCanvas {
    /// Creates a new, empty [CaptureCanvas] of the given pixel size.
    #[inline]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            ink: RgbaImage::new(width, height),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.ink.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.ink.height()
    }

    /// Returns the ink layer, without the guideline.
    #[inline]
    pub fn ink(&self) -> &RgbaImage {
        &self.ink
    }

    #[inline]
    pub(crate) fn ink_mut(&mut self) -> &mut RgbaImage {
        &mut self.ink
    }

    /// Erases all ink from this canvas.
    #[inline]
    pub fn clear(&mut self) {
        self.ink = RgbaImage::new(self.ink.width(), self.ink.height());
    }

    /// Returns `true` if any ink has been laid down. The baseline guideline is not ink.
    pub fn has_content(&self) -> bool {
        self.ink.pixels().any(|pixel| pixel[3] > 0)
    }

    /// Returns the row the baseline guideline is drawn on.
    #[inline]
    pub fn guideline_y(&self) -> u32 {
        ((self.height() as f32 * GUIDELINE_POSITION) as u32).min(self.height().saturating_sub(1))
    }

    /// Composes the guideline and the ink layer into the image currently visible on the canvas.
    pub fn compose(&self) -> RgbaImage {
        let mut visible = RgbaImage::new(self.width(), self.height());

        if self.height() > 0 {
            let y = self.guideline_y();
            let inset = (self.width() as f32 * GUIDELINE_INSET) as u32;
            let period = GUIDELINE_DASH + GUIDELINE_GAP;

            for x in inset..self.width().saturating_sub(inset) {
                if (x - inset) % period < GUIDELINE_DASH {
                    visible.put_pixel(x, y, GUIDELINE_COLOR);
                }
            }
        }

        for (x, y, ink) in self.ink.enumerate_pixels() {
            if ink[3] > 0 {
                visible.get_pixel_mut(x, y).blend(ink);
            }
        }

        visible
    }

    /// Encodes exactly what is visible on the canvas, guideline included.
    pub fn snapshot(&self) -> Result<CapturedImage, CaptureError> {
        let mut png = Cursor::new(Vec::new());

        DynamicImage::ImageRgba8(self.compose())
            .write_to(&mut png, ImageFormat::Png)
            .map_err(CaptureError::Encode)?;

        Ok(CapturedImage::from_png(
            Bytes::from(png.into_inner()),
            self.width(),
            self.height(),
        ))
    }
}
