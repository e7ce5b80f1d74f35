//! Core error types

use thiserror::Error;

/// Coarse classification used by callers to decide how to react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing or invalid credential, unknown model id. Fatal to the adapter instance.
    Configuration,
    /// The request violates a backend constraint. Fix the request and call again.
    Validation,
    /// HTTP or network failure reported by the transport.
    Transport,
    /// The backend answered with a body the parser could not use.
    ResponseShape,
    /// The backend has no such capability.
    Unsupported,
    /// A configured rate limiter refused to admit the call.
    RateLimit,
}

/// Unified error type for every adapter.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// Missing/invalid credential or unresolvable model identifier.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Caller-supplied request violates a backend-specific constraint.
    /// Always raised before any network call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The backend does not offer the requested operation.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Network failure or unreadable body, surfaced from the transport.
    #[error("HTTP error from {provider} ({endpoint}): {message}")]
    HttpError {
        provider: String,
        endpoint: String,
        message: String,
    },

    /// Non-2xx status returned by the backend.
    #[error("API error {code} from {provider} ({endpoint}): {message}")]
    ApiError {
        provider: String,
        endpoint: String,
        code: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// The backend response is missing fields the parser requires.
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("JSON error: {0}")]
    JsonError(String),

    /// A streaming response failed or ended before its terminal element.
    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Rate limit error: {0}")]
    RateLimitError(String),
}

impl LlmError {
    /// Build a transport-level failure with backend/endpoint context.
    pub fn http(
        provider: impl Into<String>,
        endpoint: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::HttpError {
            provider: provider.into(),
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Build a non-2xx API failure with backend/endpoint context.
    pub fn api(
        provider: impl Into<String>,
        endpoint: impl Into<String>,
        code: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::ApiError {
            provider: provider.into(),
            endpoint: endpoint.into(),
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationError(_) => ErrorCategory::Configuration,
            Self::InvalidInput(_) => ErrorCategory::Validation,
            Self::UnsupportedOperation(_) => ErrorCategory::Unsupported,
            Self::HttpError { .. } | Self::ApiError { .. } => ErrorCategory::Transport,
            Self::ParseError(_) | Self::JsonError(_) | Self::StreamError(_) => {
                ErrorCategory::ResponseShape
            }
            Self::RateLimitError(_) => ErrorCategory::RateLimit,
        }
    }

    /// HTTP status code, when the failure came from a backend response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether a caller-side retry could plausibly succeed.
    ///
    /// Informational only: adapters never retry on their own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpError { .. } | Self::RateLimitError(_) => true,
            Self::ApiError { code, .. } => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}
