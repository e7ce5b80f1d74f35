//! Per-adapter and per-call options

use std::sync::Arc;

use crate::execution::http::HttpTransport;
use crate::execution::rate_limit::RateLimiter;
use crate::observability::Tracer;

/// Options bundle held by every adapter instance.
///
/// Replaced wholesale by `AiService::set_options`; each call reads one snapshot
/// at its start.
#[derive(Clone, Default)]
pub struct ServiceOptions {
    /// Log native request/response bodies under the `unillm::debug` target.
    pub debug: bool,
    /// Gate every call start through this limiter.
    pub rate_limiter: Option<Arc<dyn RateLimiter>>,
    /// Replace the default reqwest transport.
    pub transport: Option<Arc<dyn HttpTransport>>,
    /// Receive call start/end/error events.
    pub tracer: Option<Arc<dyn Tracer>>,
}

impl ServiceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_tracer(mut self, tracer: Arc<dyn Tracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }
}

impl std::fmt::Debug for ServiceOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceOptions")
            .field("debug", &self.debug)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .field("has_transport", &self.transport.is_some())
            .field("has_tracer", &self.tracer.is_some())
            .finish()
    }
}

/// Per-call options for `chat`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatOptions {
    /// Request a streamed response. Falls back to `ModelConfig::stream`, then the
    /// adapter default.
    pub stream: Option<bool>,
    /// Echoed on every response of the call.
    pub session_id: Option<String>,
    /// Trace id for tracer events; generated when absent.
    pub trace_id: Option<String>,
}

impl ChatOptions {
    pub fn streaming() -> Self {
        Self {
            stream: Some(true),
            ..Default::default()
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

/// Per-call options for `embed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedOptions {
    /// Copied onto the response and the trace span.
    pub session_id: Option<String>,
    /// Correlation id for the trace span.
    pub trace_id: Option<String>,
}

impl EmbedOptions {
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}
