//! Defines the [DocumentSession] struct, the ephemeral state of the one document the signer
//! currently has open.
//!
//! A session is created when its document is opened and dropped when the queue advances or
//! the signer abandons the document. Nothing in it is persisted until a successful submission.

use chrono::NaiveDate;
use log::{debug, warn};
use std::collections::HashMap;

use crate::config::SigningConfig;
use crate::error::{SigningError, SigningResult};
use crate::signing::capture::{CaptureUpdate, SignatureCapture};
use crate::signing::document::autofill::{prefill_value, InvestorAutoFillData};
use crate::signing::document::SigningDocument;
use crate::signing::field::checkbox::{checkbox_value, is_checked};
use crate::signing::field::geometry::PageSize;
use crate::signing::field::signature::{CaptureKind, CapturedImages};
use crate::signing::field::{FieldKind, SignatureField};

/// The legal disclosure shown verbatim next to the consent checkbox.
pub const CONSENT_DISCLOSURE: &str = "By checking this box, I agree that my electronic \
signature is the legal equivalent of my handwritten signature on this document, and I consent \
to conduct this transaction by electronic means and to be legally bound by this document's \
terms.";

/// The ephemeral state of one open document.
#[derive(Debug)]
pub struct DocumentSession {
    document_id: String,
    signing_token: String,
    fields: Vec<SignatureField>,
    required_signatures: usize,
    field_values: HashMap<String, String>,
    captures: CapturedImages,
    consent_confirmed: bool,
    is_submitting: bool,
    current_page: u32,
    num_pages: u32,
    scale: f32,
    page_size: Option<PageSize>,
    signing_date: NaiveDate,
    email_locked: bool,
    autofill: InvestorAutoFillData,
    config: SigningConfig,
}

impl DocumentSession {
    /// Opens a fresh session for `document`, pre-filling every field from `autofill`.
    ///
    /// `signing_date` is the signer's current date. It is formatted once, here, and every
    /// DATE_SIGNED field keeps that value for the life of the session.
    pub fn open(
        document: &SigningDocument,
        autofill: &InvestorAutoFillData,
        config: &SigningConfig,
        signing_date: NaiveDate,
    ) -> SigningResult<Self> {
        if !document.is_openable() {
            return Err(SigningError::DocumentUnavailable(document.id.clone()));
        }

        let date_text = signing_date.format(&config.date_format).to_string();

        let field_values = document
            .fields
            .iter()
            .map(|field| {
                (
                    field.id.clone(),
                    prefill_value(field, autofill, &date_text, config.checkbox_completion),
                )
            })
            .collect();

        debug!(
            "opened session for document {} with {} fields",
            document.id,
            document.fields.len()
        );

        Ok(Self {
            document_id: document.id.clone(),
            signing_token: document.signing_token.clone(),
            fields: document.fields.clone(),
            required_signatures: document.required_signature_count(),
            field_values,
            captures: CapturedImages::default(),
            consent_confirmed: false,
            is_submitting: false,
            current_page: 1,
            num_pages: document.page_count(),
            scale: config.clamp_scale(1.0),
            page_size: None,
            signing_date,
            email_locked: autofill.has_email(),
            autofill: autofill.clone(),
            config: config.clone(),
        })
    }

    #[inline]
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    #[inline]
    pub fn signing_token(&self) -> &str {
        &self.signing_token
    }

    #[inline]
    pub fn fields(&self) -> &[SignatureField] {
        &self.fields
    }

    /// Returns the field with the given id.
    pub fn field(&self, field_id: &str) -> Option<&SignatureField> {
        self.fields.iter().find(|field| field.id == field_id)
    }

    /// Returns the fields placed on the current page.
    pub fn fields_on_current_page(&self) -> impl Iterator<Item = &SignatureField> {
        let page = self.current_page;

        self.fields
            .iter()
            .filter(move |field| field.page_number == page)
    }

    /// Returns the [FieldKind] of `field` under this session's configuration.
    #[inline]
    pub fn kind_of(&self, field: &SignatureField) -> FieldKind {
        field.kind(self.config.checkbox_completion)
    }

    /// Returns the current value of a field. Unknown fields have no value.
    #[inline]
    pub fn field_value(&self, field_id: &str) -> Option<&str> {
        self.field_values.get(field_id).map(String::as_str)
    }

    /// Returns all field values by field id.
    #[inline]
    pub fn field_values(&self) -> &HashMap<String, String> {
        &self.field_values
    }

    /// Returns the signing date fixed when this session was opened.
    #[inline]
    pub fn signing_date(&self) -> NaiveDate {
        self.signing_date
    }

    /// Returns `true` if EMAIL fields are locked because auto-fill data supplied the email.
    #[inline]
    pub fn is_email_locked(&self) -> bool {
        self.email_locked
    }

    #[inline]
    pub fn autofill(&self) -> &InvestorAutoFillData {
        &self.autofill
    }

    #[inline]
    pub fn config(&self) -> &SigningConfig {
        &self.config
    }

    /// Sets the value of an editable field. The last write wins.
    pub fn set_field_value(&mut self, field_id: &str, value: impl Into<String>) -> SigningResult<()> {
        let field = self
            .field(field_id)
            .ok_or_else(|| SigningError::UnknownField(field_id.to_string()))?;

        if !self.kind_of(field).is_editable(self.email_locked) {
            return Err(SigningError::FieldNotEditable(field_id.to_string()));
        }

        self.field_values.insert(field_id.to_string(), value.into());

        Ok(())
    }

    /// Toggles a CHECKBOX field and returns its new state.
    pub fn toggle_checkbox(&mut self, field_id: &str) -> SigningResult<bool> {
        let field = self
            .field(field_id)
            .ok_or_else(|| SigningError::UnknownField(field_id.to_string()))?;

        if !matches!(self.kind_of(field), FieldKind::Checkbox(_)) {
            return Err(SigningError::NotACheckbox(field_id.to_string()));
        }

        let checked = !self.field_value(field_id).is_some_and(is_checked);

        self.field_values
            .insert(field_id.to_string(), checkbox_value(checked).to_string());

        Ok(checked)
    }

    /// Starts a capture session for a SIGNATURE or INITIALS field, on a canvas of its own.
    pub fn begin_capture(&self, field_id: &str) -> SigningResult<SignatureCapture> {
        let kind = self.capture_kind(field_id)?;

        Ok(SignatureCapture::new(kind, &self.config))
    }

    /// Applies a capture emission to a SIGNATURE or INITIALS field.
    ///
    /// The adopted image and the field's capture marker are written together, so the two
    /// halves of the completion check can never disagree. Clearing removes the field's marker,
    /// and drops the image once no field of that kind still uses it.
    pub fn apply_capture(&mut self, field_id: &str, update: CaptureUpdate) -> SigningResult<()> {
        let kind = self.capture_kind(field_id)?;

        match update {
            CaptureUpdate::Captured(image) => {
                debug!("{} captured for field {}", kind.name(), field_id);

                self.captures.set(kind, Some(image));
                self.field_values
                    .insert(field_id.to_string(), kind.capture_marker().to_string());
            }
            CaptureUpdate::Cleared => {
                self.field_values.insert(field_id.to_string(), String::new());

                let still_used = self.fields.iter().any(|field| {
                    field.id != field_id
                        && self.kind_of(field) == FieldKind::Capture(kind)
                        && self.field_value(&field.id) == Some(kind.capture_marker())
                });

                if !still_used {
                    self.captures.set(kind, None);
                }
            }
        }

        Ok(())
    }

    /// Returns the signature and initials images adopted in this session.
    #[inline]
    pub fn captures(&self) -> &CapturedImages {
        &self.captures
    }

    /// Records whether the signer has ticked the consent checkbox.
    #[inline]
    pub fn set_consent(&mut self, confirmed: bool) {
        self.consent_confirmed = confirmed;
    }

    #[inline]
    pub fn consent_confirmed(&self) -> bool {
        self.consent_confirmed
    }

    /// Returns `true` if the given field satisfies its completion predicate.
    pub fn is_field_complete(&self, field: &SignatureField) -> bool {
        self.kind_of(field)
            .is_complete(self.field_value(&field.id), &self.captures)
    }

    /// Returns the ids of required fields that are not yet complete, in document order.
    pub fn missing_required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|field| field.required && !self.is_field_complete(field))
            .map(|field| field.id.as_str())
            .collect()
    }

    /// Returns `true` if every required field is complete.
    #[inline]
    pub fn all_required_complete(&self) -> bool {
        self.fields
            .iter()
            .filter(|field| field.required)
            .all(|field| self.is_field_complete(field))
    }

    /// Returns `true` if the document carries exactly one required SIGNATURE field, the only
    /// shape that can be legally completed.
    #[inline]
    pub fn is_completable(&self) -> bool {
        self.required_signatures == 1
    }

    /// Returns `true` if the "Sign Document" action is enabled.
    #[inline]
    pub fn can_submit(&self) -> bool {
        self.is_completable()
            && self.all_required_complete()
            && self.consent_confirmed
            && !self.is_submitting
    }

    #[inline]
    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// Claims the session for a submission. Fails while a submission is already in flight,
    /// for a document that is not completable, and whenever the submit action would be
    /// disabled.
    pub(crate) fn begin_submission(&mut self) -> SigningResult<()> {
        if self.is_submitting {
            return Err(SigningError::SubmissionInFlight);
        }

        if !self.is_completable() {
            warn!(
                "refusing to submit document {} with {} required signature fields",
                self.document_id, self.required_signatures
            );

            return Err(SigningError::NotCompletable {
                document_id: self.document_id.clone(),
                required_signatures: self.required_signatures,
            });
        }

        let missing = self.missing_required_fields();

        if !missing.is_empty() {
            return Err(SigningError::RequiredFieldsIncomplete(
                missing.into_iter().map(str::to_string).collect(),
            ));
        }

        if !self.consent_confirmed {
            return Err(SigningError::ConsentNotConfirmed);
        }

        self.is_submitting = true;

        Ok(())
    }

    /// Releases the submission claim. All field values and captures are kept, so a failed
    /// submission can be retried as is.
    #[inline]
    pub(crate) fn end_submission(&mut self) {
        self.is_submitting = false;
    }

    #[inline]
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    #[inline]
    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// Updates the page count once the page renderer has loaded the file.
    pub fn set_num_pages(&mut self, num_pages: u32) {
        self.num_pages = num_pages.max(1);
        self.go_to_page(self.current_page);
    }

    /// Moves to the given 1-based page, clamped to the document. Returns the page shown.
    pub fn go_to_page(&mut self, page: u32) -> u32 {
        let page = page.clamp(1, self.num_pages);

        if page != self.current_page {
            self.current_page = page;
            self.page_size = None;
        }

        self.current_page
    }

    #[inline]
    pub fn next_page(&mut self) -> u32 {
        self.go_to_page(self.current_page.saturating_add(1))
    }

    #[inline]
    pub fn previous_page(&mut self) -> u32 {
        self.go_to_page(self.current_page.saturating_sub(1))
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Sets the zoom factor, clamped to the configured bounds. Returns the applied factor.
    pub fn set_scale(&mut self, scale: f32) -> f32 {
        let scale = self.config.clamp_scale(scale);

        if (scale - self.scale).abs() > f32::EPSILON {
            self.scale = scale;
            self.page_size = None;
        }

        self.scale
    }

    #[inline]
    pub fn zoom_in(&mut self) -> f32 {
        self.set_scale(self.scale + self.config.scale_step)
    }

    #[inline]
    pub fn zoom_out(&mut self) -> f32 {
        self.set_scale(self.scale - self.config.scale_step)
    }

    #[inline]
    pub fn reset_zoom(&mut self) -> f32 {
        self.set_scale(1.0)
    }

    /// Returns the pixel size of the current page as last reported by the page renderer.
    /// Changing page or zoom forgets the size until the renderer reports again.
    #[inline]
    pub fn page_size(&self) -> Option<PageSize> {
        self.page_size
    }

    /// Records the pixel size the page renderer laid the current page out at.
    #[inline]
    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = Some(page_size);
    }

    fn capture_kind(&self, field_id: &str) -> SigningResult<CaptureKind> {
        let field = self
            .field(field_id)
            .ok_or_else(|| SigningError::UnknownField(field_id.to_string()))?;

        match self.kind_of(field) {
            FieldKind::Capture(kind) => Ok(kind),
            _ => Err(SigningError::NotACaptureField(field_id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::capture::canvas::CapturedImage;
    use crate::signing::field::geometry::FieldRect;
    use crate::signing::field::SignatureFieldType;
    use bytes::Bytes;

    fn rect() -> FieldRect {
        FieldRect::new(10.0, 80.0, 30.0, 6.0)
    }

    fn document() -> SigningDocument {
        SigningDocument::new("sub-agreement", "Subscription Agreement", "rcp_1", "tok_1")
            .with_content(
                "https://files.example.com/sub.pdf",
                Some(3),
                vec![
                    SignatureField::new("sig", SignatureFieldType::Signature, 3, rect()).required(),
                    SignatureField::new("ini", SignatureFieldType::Initials, 1, rect()),
                    SignatureField::new("name", SignatureFieldType::Name, 3, rect()),
                    SignatureField::new("email", SignatureFieldType::Email, 3, rect()),
                    SignatureField::new("date", SignatureFieldType::DateSigned, 3, rect()),
                    SignatureField::new("agree", SignatureFieldType::Checkbox, 2, rect()).required(),
                    SignatureField::new("note", SignatureFieldType::Text, 2, rect()),
                ],
            )
    }

    fn autofill() -> InvestorAutoFillData {
        InvestorAutoFillData {
            name: Some("Grace Hopper".into()),
            email: Some("grace@example.com".into()),
            ..Default::default()
        }
    }

    fn open() -> DocumentSession {
        DocumentSession::open(
            &document(),
            &autofill(),
            &SigningConfig::default(),
            NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
        )
        .unwrap()
    }

    fn captured() -> CaptureUpdate {
        CaptureUpdate::Captured(CapturedImage::from_png(Bytes::from_static(b"png"), 400, 200))
    }

    #[test]
    fn test_open_prefills_fields() {
        let session = open();

        assert_eq!(session.field_value("name"), Some("Grace Hopper"));
        assert_eq!(session.field_value("email"), Some("grace@example.com"));
        assert_eq!(session.field_value("date"), Some("10/15/2026"));
        assert_eq!(session.field_value("note"), Some(""));
        assert_eq!(session.num_pages(), 3);
        assert_eq!(session.current_page(), 1);
        assert!(session.is_email_locked());
    }

    #[test]
    fn test_open_rejects_document_without_content() {
        let document = SigningDocument::new("d", "Side Letter", "r", "t");

        let result = DocumentSession::open(
            &document,
            &autofill(),
            &SigningConfig::default(),
            NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
        );

        assert!(matches!(result, Err(SigningError::DocumentUnavailable(id)) if id == "d"));
    }

    #[test]
    fn test_required_gate() {
        let mut session = open();

        assert!(!session.all_required_complete());
        assert_eq!(session.missing_required_fields(), vec!["sig", "agree"]);

        session.apply_capture("sig", captured()).unwrap();
        assert_eq!(session.toggle_checkbox("agree").unwrap(), true);
        assert!(session.all_required_complete());
        assert!(!session.can_submit());

        session.set_consent(true);
        assert!(session.can_submit());

        session.apply_capture("sig", CaptureUpdate::Cleared).unwrap();
        assert!(!session.can_submit());
        assert!(session.captures().signature().is_none());
    }

    #[test]
    fn test_checkbox_toggled_off_is_incomplete_by_default() {
        let mut session = open();

        session.toggle_checkbox("agree").unwrap();
        assert_eq!(session.toggle_checkbox("agree").unwrap(), false);
        assert_eq!(session.missing_required_fields(), vec!["sig", "agree"]);

        assert!(matches!(
            session.toggle_checkbox("note"),
            Err(SigningError::NotACheckbox(_))
        ));
    }

    #[test]
    fn test_edits_respect_field_editability() {
        let mut session = open();

        session.set_field_value("note", "Wire from Chase").unwrap();
        assert_eq!(session.field_value("note"), Some("Wire from Chase"));

        for field_id in ["email", "name", "date", "sig"] {
            assert!(
                matches!(
                    session.set_field_value(field_id, "x"),
                    Err(SigningError::FieldNotEditable(_))
                ),
                "{field_id}"
            );
        }

        assert!(matches!(
            session.set_field_value("missing", "x"),
            Err(SigningError::UnknownField(_))
        ));
    }

    #[test]
    fn test_capture_only_applies_to_capture_fields() {
        let mut session = open();

        assert!(matches!(
            session.apply_capture("note", captured()),
            Err(SigningError::NotACaptureField(_))
        ));
        assert!(session.begin_capture("note").is_err());
        assert_eq!(
            session.begin_capture("ini").unwrap().kind(),
            CaptureKind::Initials
        );
    }

    #[test]
    fn test_submission_claim_is_exclusive() {
        let mut session = open();

        assert!(matches!(
            session.begin_submission(),
            Err(SigningError::RequiredFieldsIncomplete(_))
        ));

        session.apply_capture("sig", captured()).unwrap();
        session.toggle_checkbox("agree").unwrap();

        assert!(matches!(
            session.begin_submission(),
            Err(SigningError::ConsentNotConfirmed)
        ));

        session.set_consent(true);
        session.begin_submission().unwrap();

        assert!(!session.can_submit());
        assert!(matches!(
            session.begin_submission(),
            Err(SigningError::SubmissionInFlight)
        ));

        session.end_submission();
        assert!(session.can_submit());
        assert_eq!(session.field_value("sig"), Some("signed"));
    }

    fn open_with(fields: Vec<SignatureField>) -> DocumentSession {
        let document = SigningDocument::new("side-letter", "Side Letter", "rcp_1", "tok_2")
            .with_content("https://files.example.com/side.pdf", Some(1), fields);

        DocumentSession::open(
            &document,
            &autofill(),
            &SigningConfig::default(),
            NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_document_without_required_signature_cannot_be_submitted() {
        let mut session = open_with(vec![SignatureField::new(
            "note",
            SignatureFieldType::Text,
            1,
            rect(),
        )]);
        session.set_consent(true);

        assert!(session.all_required_complete());
        assert!(!session.is_completable());
        assert!(!session.can_submit());
        assert!(matches!(
            session.begin_submission(),
            Err(SigningError::NotCompletable {
                required_signatures: 0,
                ..
            })
        ));
        assert!(!session.is_submitting());
    }

    #[test]
    fn test_document_with_two_required_signatures_cannot_be_submitted() {
        let mut session = open_with(vec![
            SignatureField::new("sig1", SignatureFieldType::Signature, 1, rect()).required(),
            SignatureField::new("sig2", SignatureFieldType::Signature, 1, rect()).required(),
        ]);

        session.apply_capture("sig1", captured()).unwrap();
        session.apply_capture("sig2", captured()).unwrap();
        session.set_consent(true);

        assert!(session.all_required_complete());
        assert!(!session.can_submit());
        assert!(matches!(
            session.begin_submission(),
            Err(SigningError::NotCompletable {
                required_signatures: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_page_navigation_and_zoom() {
        let mut session = open();
        session.set_page_size(PageSize::new(600.0, 800.0).unwrap());

        assert_eq!(session.previous_page(), 1);
        assert!(session.page_size().is_some());

        assert_eq!(session.next_page(), 2);
        assert!(session.page_size().is_none());
        assert_eq!(session.go_to_page(99), 3);
        assert_eq!(session.fields_on_current_page().count(), 4);

        assert_eq!(session.zoom_in(), 1.25);
        for _ in 0..10 {
            session.zoom_in();
        }
        assert_eq!(session.scale(), 2.0);
        for _ in 0..10 {
            session.zoom_out();
        }
        assert_eq!(session.scale(), 0.5);
        assert_eq!(session.reset_zoom(), 1.0);

        session.set_num_pages(2);
        assert_eq!(session.current_page(), 2);
    }
}
