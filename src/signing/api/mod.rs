//! Defines the [SigningApi] trait, the async boundary to the signing platform, and the wire
//! shapes it exchanges. Field names on the wire are camelCase.

#[cfg(feature = "http")]
pub mod http;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::SigningResult;
use crate::signing::document::{RecipientStatus, SigningDocument};
use crate::signing::field::SignatureField;

/// Response of `GET /signing-documents`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListResponse {
    #[serde(default)]
    pub documents: Vec<AssignedDocument>,

    #[serde(default)]
    pub progress: ProgressSummary,

    #[serde(default)]
    pub current_document_id: Option<String>,
}

/// A document assigned to the signer, as listed by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedDocument {
    pub id: String,
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    pub recipient_id: String,

    /// Free-form status name, mapped leniently onto [RecipientStatus].
    #[serde(default)]
    pub recipient_status: String,

    pub signing_token: String,

    #[serde(default)]
    pub signed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub fund_id: Option<String>,
}

impl AssignedDocument {
    /// Builds the [SigningDocument] for this listing. Without sign data, or when the sign data
    /// carries no file, the document has no content and cannot be opened.
    pub fn into_signing_document(self, sign_data: Option<SignDataResponse>) -> SigningDocument {
        let status = RecipientStatus::from_name(&self.recipient_status);

        let mut document =
            SigningDocument::new(self.id, self.title, self.recipient_id, self.signing_token)
                .with_status(status);

        document.description = self.description;
        document.signed_at = self.signed_at;
        document.fund_id = self.fund_id;

        match sign_data {
            Some(SignDataResponse {
                document: SignDataDocument {
                    file_url: Some(file_url),
                    num_pages,
                    ..
                },
                fields,
                ..
            }) => document.with_content(file_url, num_pages, fields),
            _ => document,
        }
    }
}

/// Aggregate progress as reported by the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub total: usize,
    pub signed: usize,
    pub complete: bool,
}

/// Response of `GET /sign/{signingToken}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignDataResponse {
    pub recipient: SignDataRecipient,
    pub document: SignDataDocument,

    #[serde(default)]
    pub fields: Vec<SignatureField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignDataRecipient {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignDataDocument {
    pub id: String,
    pub title: String,

    #[serde(default)]
    pub file_url: Option<String>,

    #[serde(default)]
    pub num_pages: Option<u32>,
}

/// Body of `POST /sign/{signingToken}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub fields: Vec<SubmittedField>,
    pub signature_image: Option<String>,
    pub initials_image: Option<String>,
    pub consent_confirmed: bool,
}

/// A single field value in a [SubmitRequest].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedField {
    pub id: String,
    pub value: String,
}

/// Response of `POST /sign/{signingToken}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(default = "default_success")]
    pub success: bool,

    #[serde(default)]
    pub message: Option<String>,
}

fn default_success() -> bool {
    true
}

/// The signing platform, as seen by the engine.
///
/// Implementations perform no retries of their own. The engine decides which failures are
/// isolated, retryable or surfaced to the signer.
#[async_trait]
pub trait SigningApi: Send + Sync {
    /// Lists the documents assigned to the signer, optionally scoped to one fund.
    /// Returns `Ok(None)` when the platform reports that there are no documents.
    async fn list_documents(
        &self,
        fund_id: Option<&str>,
    ) -> SigningResult<Option<DocumentListResponse>>;

    /// Fetches the file location and fields of one document.
    async fn fetch_sign_data(&self, signing_token: &str) -> SigningResult<SignDataResponse>;

    /// Submits a completed document. This is the only write the engine performs.
    async fn submit_signature(
        &self,
        signing_token: &str,
        request: &SubmitRequest,
    ) -> SigningResult<SubmitResponse>;
}

#[async_trait]
impl<T> SigningApi for Arc<T>
where
    T: SigningApi + ?Sized,
{
    async fn list_documents(
        &self,
        fund_id: Option<&str>,
    ) -> SigningResult<Option<DocumentListResponse>> {
        (**self).list_documents(fund_id).await
    }

    async fn fetch_sign_data(&self, signing_token: &str) -> SigningResult<SignDataResponse> {
        (**self).fetch_sign_data(signing_token).await
    }

    async fn submit_signature(
        &self,
        signing_token: &str,
        request: &SubmitRequest,
    ) -> SigningResult<SubmitResponse> {
        (**self).submit_signature(signing_token, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::field::SignatureFieldType;

    const LIST: &str = r#"{
        "documents": [{
            "id": "doc_1",
            "title": "Subscription Agreement",
            "description": null,
            "recipientId": "rcp_1",
            "recipientStatus": "VIEWED",
            "signingToken": "tok_1",
            "signedAt": null,
            "fundId": "fund_9"
        }],
        "progress": {"total": 1, "signed": 0, "complete": false},
        "currentDocumentId": "doc_1"
    }"#;

    const SIGN_DATA: &str = r#"{
        "recipient": {"id": "rcp_1", "name": "Ada Lovelace", "email": "ada@example.com"},
        "document": {
            "id": "doc_1",
            "title": "Subscription Agreement",
            "fileUrl": "https://files.example.com/doc_1.pdf",
            "numPages": 4
        },
        "fields": [{
            "id": "sig",
            "type": "SIGNATURE",
            "pageNumber": 4,
            "x": 60, "y": 85, "width": 30, "height": 130,
            "required": true
        }]
    }"#;

    #[test]
    fn test_transform_with_sign_data() {
        let list: DocumentListResponse = serde_json::from_str(LIST).unwrap();
        let sign_data: SignDataResponse = serde_json::from_str(SIGN_DATA).unwrap();

        assert_eq!(list.progress.total, 1);
        assert_eq!(list.current_document_id.as_deref(), Some("doc_1"));

        let document = list.documents[0]
            .clone()
            .into_signing_document(Some(sign_data));

        assert!(document.is_openable());
        assert_eq!(document.recipient_status, RecipientStatus::Viewed);
        assert_eq!(document.fund_id.as_deref(), Some("fund_9"));
        assert_eq!(document.page_count(), 4);
        assert_eq!(document.fields[0].field_type, SignatureFieldType::Signature);

        // Geometry is clipped to the page on ingestion.
        assert_eq!(document.fields[0].rect.height, 15.0);
    }

    #[test]
    fn test_transform_without_sign_data() {
        let list: DocumentListResponse = serde_json::from_str(LIST).unwrap();

        let document = list.documents[0].clone().into_signing_document(None);

        assert!(!document.is_openable());
        assert!(document.fields.is_empty());
        assert_eq!(document.signing_token, "tok_1");
    }

    #[test]
    fn test_submit_request_wire_shape() {
        let request = SubmitRequest {
            fields: vec![SubmittedField {
                id: "name".into(),
                value: "Ada Lovelace".into(),
            }],
            signature_image: Some("data:image/png;base64,AAAA".into()),
            initials_image: None,
            consent_confirmed: true,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "fields": [{"id": "name", "value": "Ada Lovelace"}],
                "signatureImage": "data:image/png;base64,AAAA",
                "initialsImage": null,
                "consentConfirmed": true
            })
        );
    }

    #[test]
    fn test_submit_response_defaults_to_success() {
        let response: SubmitResponse = serde_json::from_str("{}").unwrap();
        assert!(response.success);

        let response: SubmitResponse =
            serde_json::from_str(r#"{"success":false,"message":"expired"}"#).unwrap();
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("expired"));
    }
}
