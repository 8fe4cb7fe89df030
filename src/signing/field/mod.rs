//! Defines the [SignatureField] struct, a single placeable field on a page of a
//! [SigningDocument](crate::signing::document::SigningDocument), together with the
//! [FieldKind] sum type that drives both rendering and completion.

pub mod checkbox;
pub mod geometry;
pub mod render;
pub mod signature;
pub mod text;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::signing::field::checkbox::CheckboxCompletion;
use crate::signing::field::geometry::FieldRect;
use crate::signing::field::signature::{CaptureKind, CapturedImages};
use crate::signing::field::text::TextFieldRole;

/// The type of a [SignatureField], as named by the platform API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureFieldType {
    Signature,
    Initials,
    Text,
    Checkbox,
    DateSigned,
    Name,
    Email,
    Company,
    Title,
    Address,
}

impl SignatureFieldType {
    /// Returns the wire name of this field type.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureFieldType::Signature => "SIGNATURE",
            SignatureFieldType::Initials => "INITIALS",
            SignatureFieldType::Text => "TEXT",
            SignatureFieldType::Checkbox => "CHECKBOX",
            SignatureFieldType::DateSigned => "DATE_SIGNED",
            SignatureFieldType::Name => "NAME",
            SignatureFieldType::Email => "EMAIL",
            SignatureFieldType::Company => "COMPANY",
            SignatureFieldType::Title => "TITLE",
            SignatureFieldType::Address => "ADDRESS",
        }
    }
}

impl Display for SignatureFieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field placed on one page of a document.
///
/// Geometry is expressed as percentages of the page (see [FieldRect]), so the same field lays
/// out correctly at any zoom level or rendering resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureField {
    pub id: String,

    #[serde(rename = "type")]
    pub field_type: SignatureFieldType,

    /// 1-based page number.
    pub page_number: u32,

    #[serde(flatten)]
    pub rect: FieldRect,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub placeholder: Option<String>,

    /// Pre-filled value. For SIGNATURE and INITIALS fields this is a capture marker,
    /// never the image itself.
    #[serde(default)]
    pub value: Option<String>,

    /// Overrides the configured completion rule when this is a CHECKBOX field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkbox_completion: Option<CheckboxCompletion>,
}

impl SignatureField {
    /// Creates a new optional [SignatureField] of the given type at the given position.
    pub fn new(
        id: impl Into<String>,
        field_type: SignatureFieldType,
        page_number: u32,
        rect: FieldRect,
    ) -> Self {
        Self {
            id: id.into(),
            field_type,
            page_number,
            rect,
            required: false,
            placeholder: None,
            value: None,
            checkbox_completion: None,
        }
    }

    /// Marks this field as required.
    #[inline]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the pre-filled value of this field.
    #[inline]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets the placeholder text of this field.
    #[inline]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Sets the completion rule used when this is a CHECKBOX field.
    #[inline]
    pub fn with_checkbox_completion(mut self, rule: CheckboxCompletion) -> Self {
        self.checkbox_completion = Some(rule);
        self
    }

    /// Resolves the [FieldKind] of this field. `default_checkbox` applies to CHECKBOX fields
    /// that do not carry their own completion rule.
    pub fn kind(&self, default_checkbox: CheckboxCompletion) -> FieldKind {
        match self.field_type {
            SignatureFieldType::Signature => FieldKind::Capture(CaptureKind::Signature),
            SignatureFieldType::Initials => FieldKind::Capture(CaptureKind::Initials),
            SignatureFieldType::Text => FieldKind::Text(TextFieldRole::FreeText),
            SignatureFieldType::Company => FieldKind::Text(TextFieldRole::Company),
            SignatureFieldType::Title => FieldKind::Text(TextFieldRole::Title),
            SignatureFieldType::Address => FieldKind::Text(TextFieldRole::Address),
            SignatureFieldType::Email => FieldKind::Text(TextFieldRole::Email),
            SignatureFieldType::Checkbox => {
                FieldKind::Checkbox(self.checkbox_completion.unwrap_or(default_checkbox))
            }
            SignatureFieldType::DateSigned => FieldKind::DateSigned,
            SignatureFieldType::Name => FieldKind::Name,
        }
    }

    /// Returns `true` if this field is a SIGNATURE or INITIALS field.
    #[inline]
    pub fn is_capture(&self) -> bool {
        matches!(
            self.field_type,
            SignatureFieldType::Signature | SignatureFieldType::Initials
        )
    }
}

/// The behavioural variant of a [SignatureField].
///
/// Every consumer that cares about field behaviour dispatches through one exhaustive match on
/// this type, so adding a variant forces both the renderer and [FieldKind::is_complete()]
/// to be updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A SIGNATURE or INITIALS field, filled by a signature capture.
    Capture(CaptureKind),

    /// A free text input, possibly pre-filled from investor data.
    Text(TextFieldRole),

    /// A togglable checkbox with its completion rule.
    Checkbox(CheckboxCompletion),

    /// The signing date, fixed when the document is opened.
    DateSigned,

    /// The signer's name, displayed from investor data.
    Name,
}

impl FieldKind {
    /// Returns `true` if a field of this kind holding `value` counts as complete.
    ///
    /// A capture field needs both its image in `captures` and its capture marker in `value`.
    pub fn is_complete(&self, value: Option<&str>, captures: &CapturedImages) -> bool {
        let value = value.unwrap_or_default();

        match self {
            FieldKind::Capture(kind) => {
                captures.get(*kind).is_some() && value == kind.capture_marker()
            }
            FieldKind::Text(_) | FieldKind::DateSigned | FieldKind::Name => {
                !value.trim().is_empty()
            }
            FieldKind::Checkbox(rule) => rule.is_complete(value),
        }
    }

    /// Returns `true` if the signer may type into a field of this kind. `email_locked` is set
    /// when auto-fill data supplied the signer's email.
    pub fn is_editable(&self, email_locked: bool) -> bool {
        match self {
            FieldKind::Text(role) => role.is_editable(email_locked),
            FieldKind::Capture(_)
            | FieldKind::Checkbox(_)
            | FieldKind::DateSigned
            | FieldKind::Name => false,
        }
    }
}
