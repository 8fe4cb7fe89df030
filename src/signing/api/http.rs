//! Defines the [HttpSigningApi] struct, the [SigningApi] implementation that talks to the
//! signing platform over HTTP.

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::SigningConfig;
use crate::error::{SigningError, SigningResult};
use crate::signing::api::{
    DocumentListResponse, SignDataResponse, SigningApi, SubmitRequest, SubmitResponse,
};

/// A [SigningApi] backed by the platform's REST endpoints.
#[derive(Debug, Clone)]
pub struct HttpSigningApi {
    client: Client,
    base_url: String,
}

impl HttpSigningApi {
    /// Creates a new [HttpSigningApi] for the base URL and timeout in `config`.
    pub fn new(config: &SigningConfig) -> SigningResult<Self> {
        let mut builder = Client::builder();

        if let Some(seconds) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        Ok(Self::with_client(builder.build()?, &config.api_base_url))
    }

    /// Creates a new [HttpSigningApi] using an existing client.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn sign_url(&self, signing_token: &str) -> String {
        format!("{}/sign/{}", self.base_url, signing_token)
    }
}

#[async_trait]
impl SigningApi for HttpSigningApi {
    async fn list_documents(
        &self,
        fund_id: Option<&str>,
    ) -> SigningResult<Option<DocumentListResponse>> {
        let mut request = self
            .client
            .get(format!("{}/signing-documents", self.base_url));

        if let Some(fund_id) = fund_id {
            request = request.query(&[("fundId", fund_id)]);
        }

        let response = request.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("no signing documents assigned");

            return Ok(None);
        }

        decode(response).await.map(Some)
    }

    async fn fetch_sign_data(&self, signing_token: &str) -> SigningResult<SignDataResponse> {
        let response = self.client.get(self.sign_url(signing_token)).send().await?;

        decode(response).await
    }

    async fn submit_signature(
        &self,
        signing_token: &str,
        request: &SubmitRequest,
    ) -> SigningResult<SubmitResponse> {
        let response = self
            .client
            .post(self.sign_url(signing_token))
            .json(request)
            .send()
            .await?;

        decode(response).await
    }
}

/// Decodes a JSON body, turning non-success statuses into [SigningError::Http].
async fn decode<T: DeserializeOwned>(response: Response) -> SigningResult<T> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(SigningError::Http {
            status: status.as_u16(),
            message: error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected response")
                    .to_string()
            }),
        });
    }

    Ok(serde_json::from_slice(&body)?)
}

/// Extracts the `error` or `message` member from a JSON error body.
fn error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;

    ["error", "message"]
        .iter()
        .find_map(|key| value.get(*key)?.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_body() {
        assert_eq!(
            error_message(br#"{"error":"Signing link expired"}"#).as_deref(),
            Some("Signing link expired")
        );
        assert_eq!(
            error_message(br#"{"message":"Forbidden"}"#).as_deref(),
            Some("Forbidden")
        );
        assert_eq!(error_message(b"<html>"), None);
    }

    #[test]
    fn test_urls_drop_trailing_slash() {
        let api = HttpSigningApi::with_client(Client::new(), "https://app.example.com/api/");

        assert_eq!(api.base_url(), "https://app.example.com/api");
        assert_eq!(
            api.sign_url("tok_1"),
            "https://app.example.com/api/sign/tok_1"
        );
    }
}
