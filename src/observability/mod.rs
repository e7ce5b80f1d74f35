//! Call tracing hooks
//!
//! A [`Tracer`] receives one `CallStart` and then exactly one of `CallEnd` or
//! `CallError` per adapter call. Tracers are synchronous and must not block;
//! forward to a channel if the sink is slow.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::TokenUsage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Chat,
    Embed,
}

impl Operation {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Embed => "embed",
        }
    }
}

/// Identity of one adapter call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallSpan {
    pub provider: String,
    pub operation: Operation,
    pub model: String,
    pub trace_id: String,
    pub session_id: Option<String>,
    pub stream: bool,
    pub started_at: DateTime<Utc>,
}

impl CallSpan {
    /// New span; a random trace id is generated when the caller supplies none.
    pub fn new(
        provider: impl Into<String>,
        operation: Operation,
        model: impl Into<String>,
        trace_id: Option<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            operation,
            model: model.into(),
            trace_id: trace_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            session_id: None,
            stream: false,
            started_at: Utc::now(),
        }
    }

    pub fn with_session_id(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn elapsed_ms(&self) -> u64 {
        (Utc::now() - self.started_at).num_milliseconds().max(0) as u64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    CallStart {
        span: CallSpan,
    },
    /// For streamed chats this fires when the stream is handed to the caller,
    /// so `usage` is absent.
    CallEnd {
        span: CallSpan,
        elapsed_ms: u64,
        usage: Option<TokenUsage>,
    },
    CallError {
        span: CallSpan,
        elapsed_ms: u64,
        error: String,
    },
}

impl TraceEvent {
    pub fn span(&self) -> &CallSpan {
        match self {
            Self::CallStart { span } | Self::CallEnd { span, .. } | Self::CallError { span, .. } => {
                span
            }
        }
    }
}

pub trait Tracer: Send + Sync {
    fn record(&self, event: &TraceEvent);
}

/// Forwards trace events to `tracing` under the `unillm::trace` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingTracer;

impl Tracer for LoggingTracer {
    fn record(&self, event: &TraceEvent) {
        match event {
            TraceEvent::CallStart { span } => {
                tracing::info!(
                    target: "unillm::trace",
                    provider = %span.provider,
                    operation = span.operation.as_str(),
                    model = %span.model,
                    trace_id = %span.trace_id,
                    stream = span.stream,
                    "call started"
                );
            }
            TraceEvent::CallEnd {
                span,
                elapsed_ms,
                usage,
            } => {
                tracing::info!(
                    target: "unillm::trace",
                    provider = %span.provider,
                    operation = span.operation.as_str(),
                    trace_id = %span.trace_id,
                    elapsed_ms,
                    total_tokens = usage.map(|u| u.total_tokens),
                    "call finished"
                );
            }
            TraceEvent::CallError {
                span,
                elapsed_ms,
                error,
            } => {
                tracing::warn!(
                    target: "unillm::trace",
                    provider = %span.provider,
                    operation = span.operation.as_str(),
                    trace_id = %span.trace_id,
                    elapsed_ms,
                    error = %error,
                    "call failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn span_generates_trace_id_when_missing() {
        let a = CallSpan::new("openai", Operation::Chat, "gpt-4o", None);
        let b = CallSpan::new("openai", Operation::Chat, "gpt-4o", Some("t-1".into()));
        assert_eq!(a.trace_id.len(), 36);
        assert_eq!(b.trace_id, "t-1");
    }

    #[test]
    fn events_serialize_with_tag() {
        let span = CallSpan::new("anthropic", Operation::Embed, "claude-2.1", Some("t".into()));
        let value = serde_json::to_value(TraceEvent::CallStart { span }).unwrap();
        assert_eq!(value["event"], "call_start");
        assert_eq!(value["span"]["operation"], "embed");
    }

    #[traced_test]
    #[test]
    fn logging_tracer_writes_lifecycle() {
        let span = CallSpan::new("alephalpha", Operation::Chat, "luminous-base", Some("abc".into()));
        LoggingTracer.record(&TraceEvent::CallStart { span: span.clone() });
        LoggingTracer.record(&TraceEvent::CallError {
            span,
            elapsed_ms: 3,
            error: "boom".to_string(),
        });
        assert!(logs_contain("call started"));
        assert!(logs_contain("call failed"));
        assert!(logs_contain("boom"));
    }
}
