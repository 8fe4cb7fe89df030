//! Defines the [SubmissionPipeline] struct, which serializes a completed [DocumentSession]
//! and posts it to the platform at most once per confirm action.

use log::{debug, warn};
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use crate::error::{SigningError, SigningResult};
use crate::signing::api::{SigningApi, SubmitRequest, SubmitResponse, SubmittedField};
use crate::signing::document::session::DocumentSession;
use crate::signing::field::FieldKind;

/// A validated submission, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSubmission {
    pub document_id: String,
    pub signing_token: String,
    pub request: SubmitRequest,
}

/// Posts completed documents to the platform.
///
/// The pipeline tracks the signing tokens it currently has in flight, so the same document
/// can never be submitted twice concurrently, even through two separately prepared requests.
#[derive(Debug, Default)]
pub struct SubmissionPipeline {
    in_flight: Mutex<HashSet<String>>,
}

impl SubmissionPipeline {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `session` and serializes it for submission, claiming the session's
    /// submission flag. Fails without any side effect if a submission is already in flight,
    /// a required field is incomplete or consent has not been confirmed.
    ///
    /// The caller must release the claim with [SubmissionPipeline::submit()] or
    /// [SubmissionPipeline::release()].
    pub fn prepare(session: &mut DocumentSession) -> SigningResult<PreparedSubmission> {
        session.begin_submission()?;

        Ok(PreparedSubmission {
            document_id: session.document_id().to_string(),
            signing_token: session.signing_token().to_string(),
            request: serialize(session),
        })
    }

    /// Releases the submission claim on `session` after a failed attempt, keeping every
    /// field value and capture for a retry.
    #[inline]
    pub fn release(session: &mut DocumentSession) {
        session.end_submission();
    }

    /// Sends a prepared submission. A response with `success: false` is reported as
    /// [SigningError::Rejected].
    pub async fn send<A>(
        &self,
        api: &A,
        submission: &PreparedSubmission,
    ) -> SigningResult<SubmitResponse>
    where
        A: SigningApi + ?Sized,
    {
        let _in_flight = self.claim(&submission.signing_token)?;

        debug!("submitting document {}", submission.document_id);

        let response = api
            .submit_signature(&submission.signing_token, &submission.request)
            .await?;

        if !response.success {
            let message = response
                .message
                .clone()
                .unwrap_or_else(|| "signing failed".to_string());

            warn!(
                "submission of document {} rejected: {}",
                submission.document_id, message
            );

            return Err(SigningError::Rejected(message));
        }

        Ok(response)
    }

    /// Prepares and sends `session` in one step. On failure the session is released intact.
    pub async fn submit<A>(
        &self,
        api: &A,
        session: &mut DocumentSession,
    ) -> SigningResult<SubmitResponse>
    where
        A: SigningApi + ?Sized,
    {
        let submission = Self::prepare(session)?;
        let result = self.send(api, &submission).await;

        if result.is_err() {
            Self::release(session);
        }

        result
    }

    /// Returns `true` if a submission for the signing token is in flight.
    pub fn is_in_flight(&self, signing_token: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(signing_token)
    }

    fn claim(&self, signing_token: &str) -> SigningResult<InFlight<'_>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if !in_flight.insert(signing_token.to_string()) {
            return Err(SigningError::SubmissionInFlight);
        }

        Ok(InFlight {
            in_flight: &self.in_flight,
            signing_token: signing_token.to_string(),
        })
    }
}

/// Removes a signing token from the in-flight set when the request settles or is dropped.
struct InFlight<'a> {
    in_flight: &'a Mutex<HashSet<String>>,
    signing_token: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.signing_token);
    }
}

/// Serializes every field of `session`. Capture fields carry the captured image as a data
/// URL; all other fields carry their string value.
fn serialize(session: &DocumentSession) -> SubmitRequest {
    let captures = session.captures();

    let fields = session
        .fields()
        .iter()
        .map(|field| {
            let value = match session.kind_of(field) {
                FieldKind::Capture(kind) if session.is_field_complete(field) => captures
                    .get(kind)
                    .map(|image| image.to_data_url())
                    .unwrap_or_default(),
                FieldKind::Capture(_) => String::new(),
                FieldKind::Text(_)
                | FieldKind::Checkbox(_)
                | FieldKind::DateSigned
                | FieldKind::Name => session
                    .field_value(&field.id)
                    .unwrap_or_default()
                    .to_string(),
            };

            SubmittedField {
                id: field.id.clone(),
                value,
            }
        })
        .collect();

    SubmitRequest {
        fields,
        signature_image: captures.signature().map(|image| image.to_data_url()),
        initials_image: captures.initials().map(|image| image.to_data_url()),
        consent_confirmed: session.consent_confirmed(),
    }
}
