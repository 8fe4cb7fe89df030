//! Defines the [UploadPolicy] struct, which validates uploaded signature images, and the
//! aspect-fit placement of an accepted image onto a capture canvas.

use image::imageops::{self, FilterType};
use image::DynamicImage;

use crate::error::CaptureError;
use crate::signing::capture::canvas::CaptureCanvas;

/// Validation rules for uploaded signature images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    max_bytes: usize,
}

impl UploadPolicy {
    /// Creates a new [UploadPolicy] accepting raster images up to `max_bytes` bytes.
    #[inline]
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    #[inline]
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Checks the declared MIME type and the size of an upload without decoding it.
    pub fn check(&self, mime_type: &str, size: usize) -> Result<(), CaptureError> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if !essence.starts_with("image/") || essence == "image/svg+xml" {
            return Err(CaptureError::UnsupportedMimeType(mime_type.to_string()));
        }

        if size > self.max_bytes {
            return Err(CaptureError::FileTooLarge {
                size,
                limit: self.max_bytes,
            });
        }

        Ok(())
    }

    /// Validates and decodes an upload. Nothing is drawn until this has succeeded.
    pub fn accept(&self, mime_type: &str, data: &[u8]) -> Result<DynamicImage, CaptureError> {
        self.check(mime_type, data.len())?;

        image::load_from_memory(data).map_err(CaptureError::InvalidImage)
    }
}

/// Draws `image` onto the canvas ink layer, scaled to fit entirely inside the canvas with its
/// aspect ratio preserved, and centred.
pub(crate) fn draw_aspect_fit(canvas: &mut CaptureCanvas, image: &DynamicImage) {
    let (canvas_width, canvas_height) = (canvas.width(), canvas.height());

    if image.width() == 0 || image.height() == 0 || canvas_width == 0 || canvas_height == 0 {
        return;
    }

    let (width, height) = fit_within(image.width(), image.height(), canvas_width, canvas_height);
    let resized = imageops::resize(&image.to_rgba8(), width, height, FilterType::Triangle);

    let x = i64::from((canvas_width - width) / 2);
    let y = i64::from((canvas_height - height) / 2);

    imageops::overlay(canvas.ink_mut(), &resized, x, y);
}

/// Returns the largest size with the aspect ratio of `width x height` that fits inside
/// `max_width x max_height`. Never returns a zero dimension.
fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let scale = f64::min(
        f64::from(max_width) / f64::from(width),
        f64::from(max_height) / f64::from(height),
    );

    let fitted_width = (f64::from(width) * scale).round().clamp(1.0, f64::from(max_width));
    let fitted_height = (f64::from(height) * scale).round().clamp(1.0, f64::from(max_height));

    (fitted_width as u32, fitted_height as u32)
}
