//! HTTP header builder
//!
//! Every adapter assembles its auth and version headers through this builder so
//! that malformed credentials fail as configuration errors, not at send time.

use crate::error::LlmError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

/// Accumulates headers for one request.
///
/// Values inserted through the auth methods are marked sensitive so they are
/// redacted from `Debug` output.
#[derive(Debug, Default)]
pub struct HttpHeaderBuilder {
    headers: HeaderMap,
}

impl HttpHeaderBuilder {
    /// An empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// `Authorization: Bearer <token>`
    pub fn with_bearer_auth(mut self, token: &str) -> Result<Self, LlmError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| LlmError::ConfigurationError(format!("Invalid API key format: {e}")))?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    /// Key-in-header auth such as Anthropic's `x-api-key`.
    pub fn with_custom_auth(mut self, header_name: &str, value: &str) -> Result<Self, LlmError> {
        let name = parse_name(header_name)?;
        let mut value = HeaderValue::from_str(value)
            .map_err(|e| LlmError::ConfigurationError(format!("Invalid API key format: {e}")))?;
        value.set_sensitive(true);
        self.headers.insert(name, value);
        Ok(self)
    }

    /// `Content-Type: application/json`
    pub fn with_json_content_type(mut self) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    /// Insert a plain header, replacing any earlier value of the same name.
    ///
    /// An invalid name or value is a [`LlmError::ConfigurationError`].
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, LlmError> {
        let header_name = parse_name(name)?;
        self.headers.insert(
            header_name,
            HeaderValue::from_str(value).map_err(|e| {
                LlmError::ConfigurationError(format!("Invalid header value '{value}': {e}"))
            })?,
        );
        Ok(self)
    }

    /// Add a header only when a value is present.
    pub fn with_optional_header(self, name: &str, value: Option<&str>) -> Result<Self, LlmError> {
        match value {
            Some(v) => self.with_header(name, v),
            None => Ok(self),
        }
    }

    /// Finish and hand the headers to the transport.
    pub fn build(self) -> HeaderMap {
        self.headers
    }
}

fn parse_name(name: &str) -> Result<HeaderName, LlmError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| LlmError::ConfigurationError(format!("Invalid header name '{name}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_bearer_and_json_headers() {
        let headers = HttpHeaderBuilder::new()
            .with_bearer_auth("sk-test")
            .unwrap()
            .with_json_content_type()
            .build();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer sk-test");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn optional_header_is_skipped_when_absent() {
        let headers = HttpHeaderBuilder::new()
            .with_optional_header("anthropic-beta", None)
            .unwrap()
            .with_optional_header("OpenAI-Organization", Some("org-1"))
            .unwrap()
            .build();
        assert!(headers.get("anthropic-beta").is_none());
        assert_eq!(headers.get("openai-organization").unwrap(), "org-1");
    }

    #[test]
    fn control_characters_in_key_are_configuration_errors() {
        let err = HttpHeaderBuilder::new()
            .with_custom_auth("x-api-key", "bad\nkey")
            .unwrap_err();
        assert!(matches!(err, LlmError::ConfigurationError(_)));
    }
}
