//! Defines the [FieldRect], [PageSize] and [PixelRect] structs, which convert fractional
//! field geometry into absolute overlay positions on a rendered page.
//!
//! Field coordinates are percentages (0 - 100) of the page's width and height, measured from
//! the top-left corner. Percentages keep fields independent of zoom level and rendering
//! backend: the same [FieldRect] resolves to proportionally scaled [PixelRect]s for every
//! [PageSize] the page renderer reports.

use serde::{Deserialize, Serialize};

/// The largest valid percentage coordinate.
pub const MAX_PERCENT: f32 = 100.0;

/// The position and size of a field, as percentages of its page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl FieldRect {
    /// Creates a new [FieldRect] from percentage values.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns a copy of this [FieldRect] with its origin clamped into the page and its size
    /// clipped so the field never extends past the page edge. Non-finite values become zero.
    pub fn normalized(&self) -> Self {
        let finite = |value: f32| if value.is_finite() { value } else { 0.0 };

        let x = finite(self.x).clamp(0.0, MAX_PERCENT);
        let y = finite(self.y).clamp(0.0, MAX_PERCENT);

        Self {
            x,
            y,
            width: finite(self.width).clamp(0.0, MAX_PERCENT - x),
            height: finite(self.height).clamp(0.0, MAX_PERCENT - y),
        }
    }

    /// Resolves this [FieldRect] to an absolute overlay on a page rendered at `page`.
    pub fn to_pixels(&self, page: PageSize) -> PixelRect {
        let rect = self.normalized();

        PixelRect {
            left: rect.x / MAX_PERCENT * page.width,
            top: rect.y / MAX_PERCENT * page.height,
            width: rect.width / MAX_PERCENT * page.width,
            height: rect.height / MAX_PERCENT * page.height,
        }
    }
}

/// The pixel dimensions of a rendered page, as reported by the page renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// Creates a new [PageSize]. Returns `None` unless both dimensions are positive and
    /// finite, so a renderer that has not finished laying out a page cannot report a size.
    pub fn new(width: f32, height: f32) -> Option<Self> {
        let valid = |value: f32| value.is_finite() && value > 0.0;

        (valid(width) && valid(height)).then_some(Self { width, height })
    }

    /// Returns this page size multiplied by a zoom factor.
    #[inline]
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

/// An absolute overlay rectangle in pixels, relative to the top-left corner of a rendered page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Returns `true` if the pixel position lies inside this rectangle.
    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }
}
