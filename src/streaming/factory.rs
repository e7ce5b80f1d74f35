//! SSE to chat stream conversion

use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::StreamExt;

use super::ChatStream;
use crate::error::LlmError;
use crate::execution::http::ByteStream;
use crate::types::ChatResponse;

/// Backend-specific translation of SSE events into partial responses.
///
/// Converters are stateful: one instance lives for exactly one stream and may
/// accumulate ids, tool-call fragments and usage across events.
pub trait SseEventConverter: Send {
    /// Convert one event into zero or more stream elements.
    fn convert_event(&mut self, event: &Event) -> Vec<Result<ChatResponse, LlmError>>;

    /// Handle a `[DONE]` sentinel.
    fn handle_done(&mut self) -> Vec<Result<ChatResponse, LlmError>> {
        Vec::new()
    }

    /// Whether the terminal element has been produced.
    fn is_finished(&self) -> bool;

    /// Called when the body ends; reports a truncated stream.
    fn handle_stream_end(&mut self) -> Option<Result<ChatResponse, LlmError>> {
        if self.is_finished() {
            None
        } else {
            Some(Err(LlmError::StreamError(
                "stream ended before the terminal event".to_string(),
            )))
        }
    }
}

pub struct StreamFactory;

impl StreamFactory {
    /// Decode an SSE body and run every event through `converter`.
    ///
    /// The stream stops after the first error or once the converter reports
    /// it has emitted the terminal element.
    pub fn from_sse<C>(body: ByteStream, mut converter: C) -> ChatStream
    where
        C: SseEventConverter + 'static,
    {
        let stream = async_stream::stream! {
            let mut events = Box::pin(body.eventsource());
            let mut stopped = false;
            'events: while let Some(event) = events.next().await {
                let items = match event {
                    Ok(event) => {
                        tracing::trace!(target: "unillm::http", event_name = %event.event, "sse event");
                        let data = event.data.trim();
                        if data == "[DONE]" {
                            converter.handle_done()
                        } else if data.is_empty() {
                            Vec::new()
                        } else {
                            converter.convert_event(&event)
                        }
                    }
                    Err(EventStreamError::Transport(e)) => vec![Err(e)],
                    Err(e) => vec![Err(LlmError::StreamError(format!("SSE parsing error: {e}")))],
                };
                for item in items {
                    let failed = item.is_err();
                    yield item;
                    if failed {
                        stopped = true;
                        break 'events;
                    }
                }
                if converter.is_finished() {
                    stopped = true;
                    break;
                }
            }
            if !stopped && let Some(item) = converter.handle_stream_end() {
                yield item;
            }
        };
        Box::pin(stream)
    }
}
