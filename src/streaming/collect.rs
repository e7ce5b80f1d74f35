//! Folding a stream back into one response

use futures::StreamExt;

use super::ChatStream;
use crate::error::LlmError;
use crate::types::{ChatResponse, ChatResponseResult};

/// Accumulates partial responses.
///
/// Content is concatenated per result position; ids, function calls, finish
/// reasons and usage take the latest value seen.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    response: ChatResponse,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: ChatResponse) {
        let acc = &mut self.response;
        if chunk.remote_id.is_some() {
            acc.remote_id = chunk.remote_id;
        }
        if chunk.session_id.is_some() {
            acc.session_id = chunk.session_id;
        }
        if chunk.model_usage.is_some() {
            acc.model_usage = chunk.model_usage;
        }
        if chunk.embed_model_usage.is_some() {
            acc.embed_model_usage = chunk.embed_model_usage;
        }
        for (index, result) in chunk.results.into_iter().enumerate() {
            if acc.results.len() <= index {
                acc.results.resize_with(index + 1, ChatResponseResult::default);
            }
            let slot = &mut acc.results[index];
            if let Some(delta) = result.content {
                slot.content.get_or_insert_with(String::new).push_str(&delta);
            }
            if result.name.is_some() {
                slot.name = result.name;
            }
            if result.id.is_some() {
                slot.id = result.id;
            }
            if !result.function_calls.is_empty() {
                slot.function_calls = result.function_calls;
            }
            if result.finish_reason.is_some() {
                slot.finish_reason = result.finish_reason;
            }
        }
    }

    pub fn finish(self) -> ChatResponse {
        self.response
    }
}

/// Drain a stream into a single response, failing on the first error element.
pub async fn collect_stream(mut stream: ChatStream) -> Result<ChatResponse, LlmError> {
    let mut acc = StreamAccumulator::new();
    while let Some(chunk) = stream.next().await {
        acc.push(chunk?);
    }
    Ok(acc.finish())
}
