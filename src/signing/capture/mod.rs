//! Defines the [SignatureCapture] struct, which captures a single signature or initials image
//! through one of three mutually exclusive [CaptureMode]s.
//!
//! # Overview
//!
//! - **Draw**: pointer-tracked strokes are drawn live onto the canvas. When the pointer is
//!   lifted the finished stroke is baked in and the whole canvas is emitted once.
//! - **Type**: text is rendered in a selectable [TypeFace], centred on the canvas, and the
//!   canvas is emitted again after every keystroke or font change.
//! - **Upload**: an image file is validated, aspect-fitted into the canvas and emitted once.
//!
//! Whatever the mode, every emission is a [CaptureUpdate]: either a freshly encoded raster of
//! the whole visible canvas, or [CaptureUpdate::Cleared] when nothing is captured any more.
//! Switching modes or clearing resets the canvas, the stroke history and the typed text
//! together.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut capture = SignatureCapture::new(CaptureKind::Signature, &config);
//!
//! capture.pointer_down(12.0, 140.0)?;
//! capture.pointer_move(80.0, 120.0)?;
//! capture.pointer_move(160.0, 145.0)?;
//!
//! if let Some(update) = capture.pointer_up()? {
//!     session.apply_capture(&field_id, update)?;
//! }
//! ```

pub mod canvas;
pub mod stroke;
pub mod typed;
pub mod upload;

use image::Rgba;
use log::debug;
use std::sync::Arc;

use crate::config::SigningConfig;
use crate::error::CaptureError;
use crate::signing::capture::canvas::{CaptureCanvas, CapturedImage};
use crate::signing::capture::stroke::{
    SignatureStroke, StrokePoint, DEFAULT_INK_COLOR, DEFAULT_STROKE_WIDTH,
};
use crate::signing::capture::typed::{draw_centered, TypeFace};
use crate::signing::capture::upload::{draw_aspect_fit, UploadPolicy};
use crate::signing::field::signature::CaptureKind;

/// The input mode of a [SignatureCapture].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureMode {
    Draw,
    Type,
    Upload,
}

impl CaptureMode {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            CaptureMode::Draw => "draw",
            CaptureMode::Type => "type",
            CaptureMode::Upload => "upload",
        }
    }
}

/// A change in what a [SignatureCapture] holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureUpdate {
    /// The canvas now holds this image.
    Captured(CapturedImage),

    /// Nothing is captured.
    Cleared,
}

impl CaptureUpdate {
    /// Returns the captured image, if any.
    #[inline]
    pub fn image(&self) -> Option<&CapturedImage> {
        match self {
            CaptureUpdate::Captured(image) => Some(image),
            CaptureUpdate::Cleared => None,
        }
    }
}

/// Captures one signature or initials image for one field.
///
/// A [SignatureCapture] exclusively owns its canvas. Create a new one for every field the
/// signer opens, so no state leaks from a previous field or document.
#[derive(Debug)]
pub struct SignatureCapture {
    kind: CaptureKind,
    mode: CaptureMode,
    canvas: CaptureCanvas,
    strokes: Vec<SignatureStroke>,
    active_stroke: Option<SignatureStroke>,
    typed_text: String,
    font: Option<Arc<dyn TypeFace>>,
    ink_color: Rgba<u8>,
    stroke_width: f32,
    upload_policy: UploadPolicy,
    captured: bool,
}

impl SignatureCapture {
    /// Creates a new, empty [SignatureCapture] in [CaptureMode::Draw], with a canvas sized
    /// for the given kind.
    pub fn new(kind: CaptureKind, config: &SigningConfig) -> Self {
        let (width, height) = kind.canvas_size();

        Self {
            kind,
            mode: CaptureMode::Draw,
            canvas: CaptureCanvas::new(width, height),
            strokes: Vec::new(),
            active_stroke: None,
            typed_text: String::new(),
            font: None,
            ink_color: DEFAULT_INK_COLOR,
            stroke_width: DEFAULT_STROKE_WIDTH,
            upload_policy: UploadPolicy::new(config.max_upload_bytes),
            captured: false,
        }
    }

    /// Sets the ink color used for drawn strokes and typed text.
    #[inline]
    pub fn with_ink_color(mut self, color: Rgba<u8>) -> Self {
        self.ink_color = color;
        self
    }

    /// Sets the width of drawn strokes, in pixels.
    #[inline]
    pub fn with_stroke_width(mut self, width: f32) -> Self {
        self.stroke_width = width.max(1.0);
        self
    }

    #[inline]
    pub fn kind(&self) -> CaptureKind {
        self.kind
    }

    #[inline]
    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    #[inline]
    pub fn canvas(&self) -> &CaptureCanvas {
        &self.canvas
    }

    /// Returns the completed strokes drawn so far.
    #[inline]
    pub fn strokes(&self) -> &[SignatureStroke] {
        &self.strokes
    }

    #[inline]
    pub fn typed_text(&self) -> &str {
        &self.typed_text
    }

    /// Returns the currently selected font, if any.
    #[inline]
    pub fn font(&self) -> Option<&Arc<dyn TypeFace>> {
        self.font.as_ref()
    }

    /// Returns `true` if the last emission was a captured image.
    #[inline]
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Switches to another input mode, clearing everything captured in the previous one.
    ///
    /// Returns [CaptureUpdate::Cleared] if an image had been captured, so the caller can drop
    /// it. Selecting the current mode again is a no-op.
    pub fn set_mode(&mut self, mode: CaptureMode) -> Option<CaptureUpdate> {
        if mode == self.mode {
            return None;
        }

        debug!(
            "{} capture switching from {} to {} mode",
            self.kind.name(),
            self.mode.name(),
            mode.name()
        );

        let was_captured = self.captured;

        self.reset();
        self.mode = mode;

        was_captured.then_some(CaptureUpdate::Cleared)
    }

    /// Clears the canvas, the stroke history and the typed text together.
    pub fn clear(&mut self) -> CaptureUpdate {
        self.reset();

        CaptureUpdate::Cleared
    }

    /// Starts a new stroke at the given canvas position.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Result<(), CaptureError> {
        self.require_mode(CaptureMode::Draw)?;

        let stroke = SignatureStroke::new()
            .with_stroke_width(self.stroke_width)
            .with_color(self.ink_color)
            .line_to(x, y);

        stroke.draw_onto(self.canvas.ink_mut());
        self.active_stroke = Some(stroke);

        Ok(())
    }

    /// Extends the active stroke to the given canvas position. Movement while the pointer is
    /// up is ignored.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> Result<(), CaptureError> {
        self.require_mode(CaptureMode::Draw)?;

        if let Some(stroke) = self.active_stroke.as_mut() {
            let to = StrokePoint::new(x, y);

            if let Some(from) = stroke.last_point() {
                stroke.draw_segment(self.canvas.ink_mut(), from, to);
            }

            stroke.push(to);
        }

        Ok(())
    }

    /// Finishes the active stroke and emits the canvas. Returns `None` if no stroke was in
    /// progress.
    pub fn pointer_up(&mut self) -> Result<Option<CaptureUpdate>, CaptureError> {
        self.require_mode(CaptureMode::Draw)?;

        let stroke = match self.active_stroke.take() {
            Some(stroke) => stroke,
            None => return Ok(None),
        };

        self.strokes.push(stroke);

        self.emit().map(Some)
    }

    /// Selects the font for typed signatures. In [CaptureMode::Type] the canvas is re-rendered
    /// and emitted with the new font.
    pub fn set_font(
        &mut self,
        font: Arc<dyn TypeFace>,
    ) -> Result<Option<CaptureUpdate>, CaptureError> {
        self.font = Some(font);

        if self.mode == CaptureMode::Type && !self.typed_text.is_empty() {
            return self.render_typed().map(Some);
        }

        Ok(None)
    }

    /// Replaces the typed text and emits the re-rendered canvas. Empty text emits
    /// [CaptureUpdate::Cleared].
    pub fn set_text(&mut self, text: &str) -> Result<CaptureUpdate, CaptureError> {
        self.require_mode(CaptureMode::Type)?;

        if !text.trim().is_empty() && self.font.is_none() {
            return Err(CaptureError::NoFontSelected);
        }

        self.typed_text = text.to_string();

        self.render_typed()
    }

    /// Validates an uploaded file and, if it is accepted, replaces the canvas content with the
    /// image and emits it. A rejected upload leaves the capture untouched.
    pub fn upload(&mut self, mime_type: &str, data: &[u8]) -> Result<CaptureUpdate, CaptureError> {
        self.require_mode(CaptureMode::Upload)?;

        let image = self.upload_policy.accept(mime_type, data)?;

        self.canvas.clear();
        draw_aspect_fit(&mut self.canvas, &image);

        self.emit()
    }

    fn render_typed(&mut self) -> Result<CaptureUpdate, CaptureError> {
        self.canvas.clear();

        let text = self.typed_text.trim();

        if !text.is_empty() {
            let font = self.font.as_ref().ok_or(CaptureError::NoFontSelected)?;

            if let Some(mask) = font.rasterize(text, self.kind.font_size()) {
                draw_centered(&mut self.canvas, &mask, self.ink_color);
            }
        }

        self.emit()
    }

    /// Emits the canvas: an encoded snapshot when it holds ink, otherwise `Cleared`.
    fn emit(&mut self) -> Result<CaptureUpdate, CaptureError> {
        if !self.canvas.has_content() {
            self.captured = false;

            return Ok(CaptureUpdate::Cleared);
        }

        let image = self.canvas.snapshot()?;
        self.captured = true;

        Ok(CaptureUpdate::Captured(image))
    }

    fn reset(&mut self) {
        self.canvas.clear();
        self.strokes.clear();
        self.active_stroke = None;
        self.typed_text.clear();
        self.captured = false;
    }

    fn require_mode(&self, mode: CaptureMode) -> Result<(), CaptureError> {
        if self.mode == mode {
            Ok(())
        } else {
            Err(CaptureError::WrongMode {
                active: self.mode.name(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgba, RgbaImage};
    use std::io::Cursor;

    /// A [TypeFace] that renders every non-space character as a solid block.
    #[derive(Debug)]
    struct BlockFace;

    impl TypeFace for BlockFace {
        fn name(&self) -> &str {
            "Block"
        }

        fn rasterize(&self, text: &str, px_size: f32) -> Option<GrayImage> {
            let glyphs = text.chars().filter(|c| !c.is_whitespace()).count() as u32;

            (glyphs > 0).then(|| {
                let size = px_size as u32;
                GrayImage::from_pixel(glyphs * size / 2, size, Luma([255]))
            })
        }
    }

    fn capture() -> SignatureCapture {
        SignatureCapture::new(CaptureKind::Signature, &SigningConfig::default())
    }

    fn draw_line(capture: &mut SignatureCapture) -> CaptureUpdate {
        capture.pointer_down(20.0, 30.0).unwrap();
        capture.pointer_move(60.0, 30.0).unwrap();
        capture.pointer_move(100.0, 30.0).unwrap();
        capture.pointer_up().unwrap().unwrap()
    }

    #[test]
    fn test_draw_emits_only_on_pointer_up() {
        let mut capture = capture();

        capture.pointer_down(20.0, 30.0).unwrap();
        capture.pointer_move(60.0, 30.0).unwrap();
        assert!(!capture.is_captured());

        let update = capture.pointer_up().unwrap().unwrap();
        let image = update.image().unwrap();

        assert_eq!((image.width(), image.height()), (400, 200));
        assert_eq!(image.decode().unwrap().get_pixel(40, 30)[3], 255);
        assert_eq!(capture.strokes().len(), 1);
        assert!(capture.is_captured());

        // A second pointer-up without a stroke emits nothing.
        assert_eq!(capture.pointer_up().unwrap(), None);
    }

    #[test]
    fn test_switching_mode_clears_drawn_capture() {
        let mut capture = capture();
        let drawn = draw_line(&mut capture);
        assert!(drawn.image().is_some());

        assert_eq!(capture.set_mode(CaptureMode::Type), Some(CaptureUpdate::Cleared));
        assert!(!capture.canvas().has_content());
        assert!(capture.strokes().is_empty());

        capture.set_font(Arc::new(BlockFace)).unwrap();
        let typed = capture.set_text("Ada").unwrap();
        let typed_image = typed.image().unwrap();

        assert_ne!(Some(typed_image), drawn.image());

        // The drawn line at (20..100, 30) is gone; the typed block sits in the middle.
        let pixels = typed_image.decode().unwrap();
        assert_eq!(pixels.get_pixel(20, 30)[3], 0);
        assert_eq!(pixels.get_pixel(200, 100)[3], 255);
    }

    #[test]
    fn test_typed_text_re_renders_and_empty_clears() {
        let mut capture = capture();
        capture.set_mode(CaptureMode::Type);

        assert!(matches!(
            capture.set_text("A"),
            Err(CaptureError::NoFontSelected)
        ));

        capture.set_font(Arc::new(BlockFace)).unwrap();

        let short = capture.set_text("A").unwrap();
        let long = capture.set_text("Ada Lovelace").unwrap();
        assert_ne!(short, long);
        assert!(capture.is_captured());

        assert_eq!(capture.set_text("   ").unwrap(), CaptureUpdate::Cleared);
        assert!(!capture.is_captured());
    }

    #[test]
    fn test_font_change_re_emits_in_type_mode() {
        let mut capture = capture();
        capture.set_mode(CaptureMode::Type);
        capture.set_font(Arc::new(BlockFace)).unwrap();
        capture.set_text("Ada").unwrap();

        let update = capture.set_font(Arc::new(BlockFace)).unwrap();

        assert!(matches!(update, Some(CaptureUpdate::Captured(_))));
    }

    fn png(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
        let mut png = Cursor::new(Vec::new());

        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, color))
            .write_to(&mut png, ImageFormat::Png)
            .unwrap();

        png.into_inner()
    }

    #[test]
    fn test_upload_is_centred_and_fitted() {
        let mut capture = capture();
        capture.set_mode(CaptureMode::Upload);

        let update = capture
            .upload("image/png", &png(800, 200, Rgba([200, 0, 0, 255])))
            .unwrap();
        let image = update.image().unwrap();

        assert!(capture.is_captured());
        assert_eq!((image.width(), image.height()), (400, 200));

        // An 800x200 upload fits as 400x100, centred vertically on rows 50..150.
        let pixels = image.decode().unwrap();
        for (x, y) in [(200, 100), (0, 50), (399, 149)] {
            let pixel = pixels.get_pixel(x, y);
            assert_eq!((pixel[1], pixel[2], pixel[3]), (0, 0, 255));
            assert!(pixel[0] >= 199);
        }
        assert_eq!(pixels.get_pixel(200, 20)[3], 0);
        assert_eq!(pixels.get_pixel(200, 170)[3], 0);

        // The guideline row below the image is part of the emitted snapshot.
        let guideline = pixels.get_pixel(20, capture.canvas().guideline_y());
        assert_eq!(guideline[3], 255);
        assert_ne!(guideline[0], 200);
    }

    #[test]
    fn test_rejected_upload_keeps_existing_capture() {
        let mut capture = capture();
        capture.set_mode(CaptureMode::Upload);
        capture
            .upload("image/png", &png(800, 200, Rgba([200, 0, 0, 255])))
            .unwrap();

        let ink = capture.canvas().ink().clone();

        assert!(matches!(
            capture.upload("application/pdf", b"%PDF-1.7"),
            Err(CaptureError::UnsupportedMimeType(_))
        ));
        assert!(capture.is_captured());
        assert!(capture.canvas().ink() == &ink);

        let oversized = vec![0; SigningConfig::default().max_upload_bytes + 1];

        assert!(matches!(
            capture.upload("image/png", &oversized),
            Err(CaptureError::FileTooLarge { .. })
        ));
        assert!(capture.is_captured());
        assert!(capture.canvas().ink() == &ink);
    }

    #[test]
    fn test_inputs_for_other_modes_are_rejected() {
        let mut capture = capture();

        assert!(matches!(
            capture.set_text("Ada"),
            Err(CaptureError::WrongMode { active: "draw" })
        ));

        capture.set_mode(CaptureMode::Upload);
        assert!(capture.pointer_down(1.0, 1.0).is_err());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut capture = capture();
        draw_line(&mut capture);

        assert_eq!(capture.clear(), CaptureUpdate::Cleared);
        assert!(!capture.canvas().has_content());
        assert!(capture.strokes().is_empty());
        assert!(capture.typed_text().is_empty());
        assert!(!capture.is_captured());
    }

    #[test]
    fn test_initials_canvas_size() {
        let capture = SignatureCapture::new(CaptureKind::Initials, &SigningConfig::default());

        assert_eq!((capture.canvas().width(), capture.canvas().height()), (200, 100));
    }
}
