//! Defines the [SigningDocument] struct, one document instance assigned to the signer.

pub mod autofill;
pub mod session;

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::signing::field::{SignatureField, SignatureFieldType};

/// The recipient status reported by the platform for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipientStatus {
    Pending,
    Sent,
    Viewed,
    Signed,
    Declined,
}

impl RecipientStatus {
    /// Parses a status name case-insensitively. Unrecognised names are treated as
    /// [RecipientStatus::Pending], since the queue only distinguishes signed, declined and
    /// everything else.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "SIGNED" | "COMPLETED" => RecipientStatus::Signed,
            "DECLINED" => RecipientStatus::Declined,
            "SENT" => RecipientStatus::Sent,
            "VIEWED" => RecipientStatus::Viewed,
            _ => RecipientStatus::Pending,
        }
    }

    #[inline]
    pub fn is_signed(&self) -> bool {
        matches!(self, RecipientStatus::Signed)
    }
}

/// One document in the signer's queue.
///
/// A document whose sign data could not be fetched has no [SigningDocument::file_url] and no
/// fields. It still occupies its position in the queue but cannot be opened.
#[derive(Debug, Clone, PartialEq)]
pub struct SigningDocument {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub file_url: Option<String>,
    pub num_pages: Option<u32>,
    pub fields: Vec<SignatureField>,
    pub recipient_id: String,
    pub recipient_status: RecipientStatus,
    pub signing_token: String,
    pub signed_at: Option<DateTime<Utc>>,
    pub fund_id: Option<String>,
}

impl SigningDocument {
    /// Creates a new [SigningDocument] with no content. Use [SigningDocument::with_content()]
    /// to attach the renderable file and its fields.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        recipient_id: impl Into<String>,
        signing_token: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            file_url: None,
            num_pages: None,
            fields: Vec::new(),
            recipient_id: recipient_id.into(),
            recipient_status: RecipientStatus::Pending,
            signing_token: signing_token.into(),
            signed_at: None,
            fund_id: None,
        }
    }

    /// Attaches the renderable file and the signer's fields to this document. Field geometry
    /// is normalized into the page on the way in.
    pub fn with_content(
        mut self,
        file_url: impl Into<String>,
        num_pages: Option<u32>,
        fields: Vec<SignatureField>,
    ) -> Self {
        self.file_url = Some(file_url.into());
        self.num_pages = num_pages;
        self.fields = fields
            .into_iter()
            .map(|mut field| {
                field.rect = field.rect.normalized();
                field.page_number = field.page_number.max(1);
                field
            })
            .collect();

        if let Some(reported) = self.num_pages {
            if let Some(field) = self
                .fields
                .iter()
                .find(|field| field.page_number > reported)
            {
                warn!(
                    "document {} reports {} pages but field {} is on page {}",
                    self.id, reported, field.id, field.page_number
                );
            }
        }

        let required_signatures = self.required_signature_count();

        if required_signatures != 1 {
            warn!(
                "document {} has {} required signature fields, expected exactly one",
                self.id, required_signatures
            );
        }

        self
    }

    /// Sets the recipient status of this document.
    #[inline]
    pub fn with_status(mut self, status: RecipientStatus) -> Self {
        self.recipient_status = status;
        self
    }

    /// Returns `true` if this document has content that can be opened for signing.
    #[inline]
    pub fn is_openable(&self) -> bool {
        self.file_url.is_some()
    }

    /// Returns the number of pages to page through: the reported page count, raised to the
    /// highest page any field is placed on.
    pub fn page_count(&self) -> u32 {
        let highest_field_page = self
            .fields
            .iter()
            .map(|field| field.page_number)
            .max()
            .unwrap_or(1);

        self.num_pages
            .unwrap_or(highest_field_page)
            .max(highest_field_page)
            .max(1)
    }

    /// Returns the number of required SIGNATURE fields. A document is legally completable only
    /// when this is exactly one.
    pub fn required_signature_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|field| field.required && field.field_type == SignatureFieldType::Signature)
            .count()
    }

    /// Returns the fields placed on the given 1-based page.
    pub fn fields_on_page(&self, page_number: u32) -> impl Iterator<Item = &SignatureField> {
        self.fields
            .iter()
            .filter(move |field| field.page_number == page_number)
    }
}
