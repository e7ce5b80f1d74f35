//! HTTP transport abstraction
//!
//! Adapters never talk to `reqwest` directly. They hand a fully built request to
//! an [`HttpTransport`], which returns the raw status, headers and body. Status
//! classification happens afterwards in [`classify_status`], so a custom
//! transport (a test double, a proxy, a recorder) gets the same error mapping as
//! the default one.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::error::LlmError;

/// Raw response body chunks of a streaming call.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, LlmError>> + Send>>;

/// Transport-level request data for JSON POST requests.
#[derive(Debug, Clone)]
pub struct HttpTransportRequest {
    /// Backend identifier, carried into error context.
    pub provider: String,
    pub url: String,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

/// Transport-level response data.
#[derive(Debug, Clone)]
pub struct HttpTransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Streaming response: status and headers up front, body as chunks.
pub struct HttpTransportStreamResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: ByteStream,
}

impl std::fmt::Debug for HttpTransportStreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransportStreamResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute_json(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportResponse, LlmError>;

    async fn execute_stream(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportStreamResponse, LlmError>;
}

/// Default transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn send(
        &self,
        request: &HttpTransportRequest,
        headers: HeaderMap,
    ) -> Result<reqwest::Response, LlmError> {
        tracing::debug!(target: "unillm::http", provider = %request.provider, url = %request.url, "sending request");
        self.client
            .post(&request.url)
            .headers(headers)
            .json(&request.body)
            .send()
            .await
            .map_err(|e| {
                tracing::debug!(target: "unillm::http", provider = %request.provider, url = %request.url, err = %e, "request error");
                LlmError::http(&request.provider, &request.url, e.to_string())
            })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute_json(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportResponse, LlmError> {
        let response = self.send(&request, request.headers.clone()).await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        tracing::debug!(target: "unillm::http", provider = %request.provider, url = %request.url, status, "response received");
        let body = response
            .bytes()
            .await
            .map_err(|e| LlmError::http(&request.provider, &request.url, e.to_string()))?;
        Ok(HttpTransportResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }

    async fn execute_stream(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportStreamResponse, LlmError> {
        let mut headers = request.headers.clone();
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        let response = self.send(&request, headers).await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        tracing::debug!(target: "unillm::http", provider = %request.provider, url = %request.url, status, stream = true, "response received");

        let provider = request.provider;
        let url = request.url;
        let body = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| LlmError::http(&provider, &url, e.to_string())));
        Ok(HttpTransportStreamResponse {
            status,
            headers,
            body: Box::pin(body),
        })
    }
}

/// Map a non-2xx status to [`LlmError::ApiError`], keeping the decoded body as details.
pub fn classify_status(provider: &str, url: &str, status: u16, body: &[u8]) -> Result<(), LlmError> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    let details = serde_json::from_slice::<serde_json::Value>(body).ok();
    let message = details
        .as_ref()
        .and_then(extract_error_message)
        .unwrap_or_else(|| {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                format!("HTTP {status}")
            } else {
                text
            }
        });
    Err(LlmError::ApiError {
        provider: provider.to_string(),
        endpoint: url.to_string(),
        code: status,
        message,
        details,
    })
}

/// Pull a human-readable message out of the common error envelopes:
/// `{"error": {"message": ..}}`, `{"error": ".."}` and `{"message": ..}`.
pub fn extract_error_message(body: &serde_json::Value) -> Option<String> {
    let error = body.get("error");
    error
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .or_else(|| error.and_then(|e| e.as_str()))
        .or_else(|| body.get("message").and_then(|m| m.as_str()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_statuses_pass_through() {
        assert!(classify_status("openai", "u", 200, b"{}").is_ok());
        assert!(classify_status("openai", "u", 204, b"").is_ok());
    }

    #[test]
    fn nested_error_message_is_extracted() {
        let body = json!({"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}});
        let err = classify_status(
            "anthropic",
            "https://api.anthropic.com/v1/messages",
            529,
            body.to_string().as_bytes(),
        )
        .unwrap_err();
        match err {
            LlmError::ApiError {
                code,
                message,
                details,
                ..
            } => {
                assert_eq!(code, 529);
                assert_eq!(message, "Overloaded");
                assert!(details.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn flat_and_plain_text_bodies_are_handled() {
        assert_eq!(
            extract_error_message(&json!({"message": "bad token"})),
            Some("bad token".to_string())
        );
        assert_eq!(
            extract_error_message(&json!({"error": "quota"})),
            Some("quota".to_string())
        );
        let err = classify_status("alephalpha", "u", 502, b"Bad Gateway").unwrap_err();
        assert!(err.to_string().contains("Bad Gateway"));
        let err = classify_status("alephalpha", "u", 500, b"").unwrap_err();
        assert!(err.to_string().contains("HTTP 500"));
    }
}
