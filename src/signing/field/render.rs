//! Defines the [FieldRenderer] struct, which lays out the fields of the current page of a
//! [DocumentSession] as absolutely positioned [FieldOverlay]s over the rendered page.

use bitflags::bitflags;

use crate::signing::document::session::DocumentSession;
use crate::signing::field::checkbox::is_checked;
use crate::signing::field::geometry::{PageSize, PixelRect};
use crate::signing::field::text::TextFieldRole;
use crate::signing::field::{FieldKind, SignatureField};

bitflags! {
    /// Visual decorations applied to a [FieldOverlay].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OverlayDecorations: u8 {
        /// The field is required; a "required" badge is shown while it is incomplete.
        const REQUIRED = 0b0001;

        /// The field is an uncaptured SIGNATURE or INITIALS field calling for attention.
        const PULSING = 0b0010;

        /// The field satisfies its completion predicate.
        const COMPLETED = 0b0100;

        /// The signer cannot change the field's content directly.
        const READ_ONLY = 0b1000;
    }
}

/// The content of a single [FieldOverlay].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldContent {
    /// An uncaptured SIGNATURE or INITIALS field. Activating it opens a signature capture.
    CapturePlaceholder { label: &'static str },

    /// A captured SIGNATURE or INITIALS field, showing the adopted image.
    CapturedImage { data_url: String },

    /// A text input bound to the field value.
    TextInput {
        value: String,
        placeholder: Option<String>,
        read_only: bool,
    },

    /// A toggle control.
    Checkbox { checked: bool },

    /// The non-editable signing date.
    DateSigned { text: String },

    /// The non-editable signer name.
    Name { text: String },
}

/// A field laid out on the current page.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOverlay {
    pub field_id: String,
    pub rect: PixelRect,
    pub content: FieldContent,
    pub decorations: OverlayDecorations,
}

impl FieldOverlay {
    #[inline]
    pub fn is_required(&self) -> bool {
        self.decorations.contains(OverlayDecorations::REQUIRED)
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.decorations.contains(OverlayDecorations::COMPLETED)
    }

    /// Returns `true` if a "required" badge should be shown on this overlay.
    #[inline]
    pub fn shows_required_badge(&self) -> bool {
        self.is_required() && !self.is_completed()
    }
}

/// Lays out the fields of a [DocumentSession] over its current page.
pub struct FieldRenderer<'a> {
    session: &'a DocumentSession,
}

impl<'a> FieldRenderer<'a> {
    #[inline]
    pub fn new(session: &'a DocumentSession) -> Self {
        Self { session }
    }

    /// Renders every field on the session's current page at the page size most recently
    /// reported by the page renderer. Returns nothing until a page size is known.
    pub fn render_current_page(&self) -> Vec<FieldOverlay> {
        match self.session.page_size() {
            Some(page_size) => self
                .session
                .fields_on_current_page()
                .map(|field| self.render_field(field, page_size))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Renders a single field for a page laid out at `page_size`.
    pub fn render_field(&self, field: &SignatureField, page_size: PageSize) -> FieldOverlay {
        let session = self.session;
        let value = session.field_value(&field.id).unwrap_or_default();
        let kind = session.kind_of(field);
        let completed = session.is_field_complete(field);

        let mut decorations = OverlayDecorations::empty();

        decorations.set(OverlayDecorations::REQUIRED, field.required);
        decorations.set(OverlayDecorations::COMPLETED, completed);
        decorations.set(
            OverlayDecorations::READ_ONLY,
            !kind.is_editable(session.is_email_locked())
                && !matches!(kind, FieldKind::Checkbox(_) | FieldKind::Capture(_)),
        );

        let content = match kind {
            FieldKind::Capture(capture_kind) => match session.captures().get(capture_kind) {
                Some(image) if completed => FieldContent::CapturedImage {
                    data_url: image.to_data_url(),
                },
                _ => {
                    decorations.insert(OverlayDecorations::PULSING);

                    FieldContent::CapturePlaceholder {
                        label: capture_kind.placeholder_label(),
                    }
                }
            },
            FieldKind::Text(role) => FieldContent::TextInput {
                value: value.to_string(),
                placeholder: field
                    .placeholder
                    .clone()
                    .or_else(|| default_placeholder(role).map(str::to_string)),
                read_only: !role.is_editable(session.is_email_locked()),
            },
            FieldKind::Checkbox(_) => FieldContent::Checkbox {
                checked: is_checked(value),
            },
            FieldKind::DateSigned => FieldContent::DateSigned {
                text: value.to_string(),
            },
            FieldKind::Name => FieldContent::Name {
                text: value.to_string(),
            },
        };

        FieldOverlay {
            field_id: field.id.clone(),
            rect: field.rect.to_pixels(page_size),
            content,
            decorations,
        }
    }

    /// Returns the id of the topmost field on the current page under the pixel position, if
    /// the page size is known.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<&'a str> {
        let page_size = self.session.page_size()?;

        self.session
            .fields_on_current_page()
            .filter(|field| field.rect.to_pixels(page_size).contains(x, y))
            .last()
            .map(|field| field.id.as_str())
    }
}

fn default_placeholder(role: TextFieldRole) -> Option<&'static str> {
    match role {
        TextFieldRole::FreeText => None,
        TextFieldRole::Company => Some("Company"),
        TextFieldRole::Title => Some("Title"),
        TextFieldRole::Address => Some("Address"),
        TextFieldRole::Email => Some("Email"),
    }
}
