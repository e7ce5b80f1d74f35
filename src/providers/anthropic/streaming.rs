//! Anthropic SSE stream conversion
//!
//! Event order: `message_start`, then per content block `content_block_start`,
//! any number of `content_block_delta`, `content_block_stop`, then
//! `message_delta` and finally `message_stop`. `ping` may appear anywhere;
//! `error` ends the stream.

use std::collections::BTreeMap;

use eventsource_stream::Event;

use super::types::{ResponseContentBlock, StreamEvent};
use super::utils::parse_finish_reason;
use crate::error::LlmError;
use crate::streaming::SseEventConverter;
use crate::types::{ChatResponse, ChatResponseResult, FinishReason, FunctionCall, TokenUsage};

#[derive(Debug, Default)]
struct ToolBlock {
    id: String,
    name: String,
    partial_json: String,
}

/// Stateful converter for one Anthropic stream.
#[derive(Debug, Default)]
pub struct AnthropicEventConverter {
    session_id: Option<String>,
    message_id: Option<String>,
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
    stop_reason: Option<String>,
    tool_blocks: BTreeMap<usize, ToolBlock>,
    finished: bool,
}

impl AnthropicEventConverter {
    pub fn new(session_id: Option<String>) -> Self {
        Self {
            session_id,
            ..Default::default()
        }
    }

    fn partial(&self, text: String) -> ChatResponse {
        ChatResponse {
            session_id: self.session_id.clone(),
            remote_id: self.message_id.clone(),
            results: vec![ChatResponseResult::text(text)],
            ..Default::default()
        }
    }

    /// Final element; tool input that does not parse as JSON fails the stream.
    fn terminal(&mut self) -> Result<ChatResponse, LlmError> {
        let function_calls = std::mem::take(&mut self.tool_blocks)
            .into_values()
            .map(|block| {
                let arguments = if block.partial_json.trim().is_empty() {
                    serde_json::json!({})
                } else {
                    serde_json::from_str(&block.partial_json).map_err(|e| {
                        LlmError::ParseError(format!(
                            "Anthropic tool_use input for '{}' is not valid JSON: {e}",
                            block.name
                        ))
                    })?
                };
                Ok(FunctionCall::new(block.id, block.name, Some(arguments)))
            })
            .collect::<Result<Vec<_>, LlmError>>()?;
        let model_usage = match (self.input_tokens, self.output_tokens) {
            (Some(input), Some(output)) => Some(TokenUsage::new(input, output)),
            _ => None,
        };
        Ok(ChatResponse {
            session_id: self.session_id.clone(),
            remote_id: self.message_id.clone(),
            results: vec![ChatResponseResult {
                function_calls,
                finish_reason: parse_finish_reason(self.stop_reason.as_deref())
                    .or(Some(FinishReason::Stop)),
                ..Default::default()
            }],
            model_usage,
            ..Default::default()
        })
    }

    fn convert(&mut self, event: StreamEvent) -> Vec<Result<ChatResponse, LlmError>> {
        match event.event_type.as_str() {
            "message_start" => {
                if let Some(message) = event.message {
                    self.message_id = Some(message.id);
                    if let Some(usage) = message.usage {
                        self.input_tokens = usage.input_tokens;
                        self.output_tokens = usage.output_tokens;
                    }
                }
                Vec::new()
            }
            "content_block_start" => match (event.index, event.content_block) {
                (Some(index), Some(ResponseContentBlock::ToolUse { id, name, .. })) => {
                    self.tool_blocks.insert(
                        index,
                        ToolBlock {
                            id,
                            name,
                            partial_json: String::new(),
                        },
                    );
                    Vec::new()
                }
                (_, Some(ResponseContentBlock::Text { text })) if !text.is_empty() => {
                    vec![Ok(self.partial(text))]
                }
                _ => Vec::new(),
            },
            "content_block_delta" => {
                let Some(delta) = event.delta else {
                    return Vec::new();
                };
                if let Some(text) = delta.text.filter(|t| !t.is_empty()) {
                    return vec![Ok(self.partial(text))];
                }
                if let (Some(fragment), Some(index)) = (delta.partial_json, event.index)
                    && let Some(block) = self.tool_blocks.get_mut(&index)
                {
                    block.partial_json.push_str(&fragment);
                }
                Vec::new()
            }
            "message_delta" => {
                if let Some(stop_reason) = event.delta.and_then(|d| d.stop_reason) {
                    self.stop_reason = Some(stop_reason);
                }
                if let Some(output) = event.usage.and_then(|u| u.output_tokens) {
                    self.output_tokens = Some(output);
                }
                Vec::new()
            }
            "message_stop" => {
                self.finished = true;
                vec![self.terminal()]
            }
            "error" => {
                let (kind, message) = event
                    .error
                    .map(|e| (e.error_type, e.message))
                    .unwrap_or_default();
                vec![Err(LlmError::StreamError(format!(
                    "Anthropic stream error ({}): {}",
                    kind.as_deref().unwrap_or("unknown"),
                    message.as_deref().unwrap_or("no message")
                )))]
            }
            _ => Vec::new(),
        }
    }
}

impl SseEventConverter for AnthropicEventConverter {
    fn convert_event(&mut self, event: &Event) -> Vec<Result<ChatResponse, LlmError>> {
        match serde_json::from_str::<StreamEvent>(&event.data) {
            Ok(parsed) => self.convert(parsed),
            Err(e) => vec![Err(LlmError::ParseError(format!(
                "Failed to parse Anthropic event: {e}"
            )))],
        }
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}
