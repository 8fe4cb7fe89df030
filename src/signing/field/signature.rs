//! Defines the [CaptureKind] enum, distinguishing SIGNATURE from INITIALS fields, and the
//! [CapturedImages] held by a document session.

use crate::signing::capture::canvas::CapturedImage;

/// Which of the two capture field types a signature capture fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureKind {
    Signature,
    Initials,
}

impl CaptureKind {
    /// Returns the fixed capture canvas size, in pixels, for this kind.
    #[inline]
    pub fn canvas_size(&self) -> (u32, u32) {
        match self {
            CaptureKind::Signature => (400, 200),
            CaptureKind::Initials => (200, 100),
        }
    }

    /// Returns the pixel size at which typed text is rendered for this kind.
    #[inline]
    pub fn font_size(&self) -> f32 {
        match self {
            CaptureKind::Signature => 36.0,
            CaptureKind::Initials => 28.0,
        }
    }

    /// Returns the opaque value stored for a field of this kind once it has been captured.
    #[inline]
    pub fn capture_marker(&self) -> &'static str {
        match self {
            CaptureKind::Signature => "signed",
            CaptureKind::Initials => "initialed",
        }
    }

    /// Returns the call to action shown on an empty field of this kind.
    #[inline]
    pub fn placeholder_label(&self) -> &'static str {
        match self {
            CaptureKind::Signature => "Sign here",
            CaptureKind::Initials => "Initial here",
        }
    }

    /// Returns a short lower-case name, used in log output.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            CaptureKind::Signature => "signature",
            CaptureKind::Initials => "initials",
        }
    }
}

/// The signature and initials images adopted by the signer for the open document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapturedImages {
    signature: Option<CapturedImage>,
    initials: Option<CapturedImage>,
}

impl CapturedImages {
    /// Returns the image captured for the given kind, if any.
    #[inline]
    pub fn get(&self, kind: CaptureKind) -> Option<&CapturedImage> {
        match kind {
            CaptureKind::Signature => self.signature.as_ref(),
            CaptureKind::Initials => self.initials.as_ref(),
        }
    }

    /// Replaces the image captured for the given kind.
    #[inline]
    pub fn set(&mut self, kind: CaptureKind, image: Option<CapturedImage>) {
        match kind {
            CaptureKind::Signature => self.signature = image,
            CaptureKind::Initials => self.initials = image,
        }
    }

    #[inline]
    pub fn signature(&self) -> Option<&CapturedImage> {
        self.signature.as_ref()
    }

    #[inline]
    pub fn initials(&self) -> Option<&CapturedImage> {
        self.initials.as_ref()
    }
}
