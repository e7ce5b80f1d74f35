//! OpenAI SSE stream conversion
//!
//! Every event is a `chat.completion.chunk`. Text arrives in `delta.content`,
//! tool calls arrive as fragments keyed by `(choice, tool index)`, and with
//! `include_usage` the last chunk carries usage and no choices. The stream
//! ends with a literal `[DONE]`.

use std::collections::{BTreeMap, BTreeSet};

use eventsource_stream::Event;

use super::transformers::{parse_finish_reason, parse_usage};
use super::types::ChatCompletionChunk;
use crate::error::LlmError;
use crate::streaming::SseEventConverter;
use crate::types::{ChatResponse, ChatResponseResult, FinishReason, FunctionCall, TokenUsage};

#[derive(Debug, Default)]
struct ToolCallState {
    id: String,
    name: String,
    arguments: String,
}

#[derive(Debug, Default)]
pub struct OpenAiEventConverter {
    session_id: Option<String>,
    remote_id: Option<String>,
    finish_reasons: BTreeMap<usize, FinishReason>,
    tool_calls: BTreeMap<(usize, usize), ToolCallState>,
    usage: Option<TokenUsage>,
    /// Choices requested (`n`); higher indices are rejected.
    choices: usize,
    seen_choices: BTreeSet<usize>,
    finished: bool,
}

impl OpenAiEventConverter {
    pub fn new(session_id: Option<String>) -> Self {
        Self {
            session_id,
            ..Default::default()
        }
    }

    /// Accept choice indices below `choices` (default 1).
    pub fn with_choices(mut self, choices: usize) -> Self {
        self.choices = choices;
        self
    }

    fn choice_limit(&self) -> usize {
        self.choices.max(1)
    }

    /// Partial element with `text` at position `index`.
    fn partial(&self, index: usize, text: String) -> ChatResponse {
        let mut results = vec![ChatResponseResult::default(); index];
        results.push(ChatResponseResult {
            id: Some(index.to_string()),
            ..ChatResponseResult::text(text)
        });
        ChatResponse {
            session_id: self.session_id.clone(),
            remote_id: self.remote_id.clone(),
            results,
            ..Default::default()
        }
    }

    fn terminal(&mut self) -> ChatResponse {
        let mut calls = std::mem::take(&mut self.tool_calls);
        let last = self.seen_choices.last().copied().unwrap_or(0);
        let results = (0..=last)
            .map(|choice| {
                if !self.seen_choices.is_empty() && !self.seen_choices.contains(&choice) {
                    return ChatResponseResult::default();
                }
                let keys: Vec<_> = calls.range((choice, 0)..=(choice, usize::MAX)).map(|(k, _)| *k).collect();
                let function_calls = keys
                    .into_iter()
                    .filter_map(|key| calls.remove(&key))
                    .map(|call| {
                        FunctionCall::new(
                            call.id,
                            call.name,
                            Some(serde_json::Value::String(call.arguments)),
                        )
                    })
                    .collect();
                ChatResponseResult {
                    id: Some(choice.to_string()),
                    function_calls,
                    finish_reason: Some(
                        self.finish_reasons
                            .get(&choice)
                            .copied()
                            .unwrap_or(FinishReason::Stop),
                    ),
                    ..Default::default()
                }
            })
            .collect();
        ChatResponse {
            session_id: self.session_id.clone(),
            remote_id: self.remote_id.clone(),
            results,
            model_usage: self.usage,
            ..Default::default()
        }
    }

    fn convert(&mut self, chunk: ChatCompletionChunk) -> Vec<Result<ChatResponse, LlmError>> {
        if let Some(id) = chunk.id.filter(|id| !id.is_empty()) {
            self.remote_id = Some(id);
        }
        if let Some(usage) = parse_usage(chunk.usage) {
            self.usage = Some(usage);
        }
        let limit = self.choice_limit();
        if let Some(bad) = chunk.choices.iter().find(|c| c.index >= limit) {
            return vec![Err(LlmError::ParseError(format!(
                "OpenAI chunk has choice index {} but only {limit} choice(s) were requested",
                bad.index
            )))];
        }
        let mut out = Vec::new();
        for choice in chunk.choices {
            self.seen_choices.insert(choice.index);
            if let Some(reason) = parse_finish_reason(choice.finish_reason.as_deref()) {
                self.finish_reasons.insert(choice.index, reason);
            }
            for delta in choice.delta.tool_calls.unwrap_or_default() {
                let state = self.tool_calls.entry((choice.index, delta.index)).or_default();
                if let Some(id) = delta.id {
                    state.id = id;
                }
                if let Some(function) = delta.function {
                    if let Some(name) = function.name {
                        state.name.push_str(&name);
                    }
                    if let Some(arguments) = function.arguments {
                        state.arguments.push_str(&arguments);
                    }
                }
            }
            if let Some(text) = choice.delta.content.filter(|t| !t.is_empty()) {
                out.push(Ok(self.partial(choice.index, text)));
            }
        }
        out
    }
}

impl SseEventConverter for OpenAiEventConverter {
    fn convert_event(&mut self, event: &Event) -> Vec<Result<ChatResponse, LlmError>> {
        let value: serde_json::Value = match serde_json::from_str(&event.data) {
            Ok(value) => value,
            Err(e) => {
                return vec![Err(LlmError::ParseError(format!(
                    "Failed to parse OpenAI chunk: {e}"
                )))];
            }
        };
        if let Some(error) = value.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error");
            return vec![Err(LlmError::StreamError(format!(
                "OpenAI stream error: {message}"
            )))];
        }
        match serde_json::from_value::<ChatCompletionChunk>(value) {
            Ok(chunk) => self.convert(chunk),
            Err(e) => vec![Err(LlmError::ParseError(format!(
                "Failed to parse OpenAI chunk: {e}"
            )))],
        }
    }

    fn handle_done(&mut self) -> Vec<Result<ChatResponse, LlmError>> {
        if self.finished {
            return Vec::new();
        }
        self.finished = true;
        vec![Ok(self.terminal())]
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(data: serde_json::Value) -> Event {
        Event {
            event: "message".to_string(),
            data: data.to_string(),
            id: String::new(),
            retry: None,
        }
    }

    fn chunk(choices: serde_json::Value) -> serde_json::Value {
        json!({"id": "chatcmpl-7", "object": "chat.completion.chunk", "choices": choices})
    }

    #[test]
    fn text_deltas_and_trailing_usage() {
        let mut converter = OpenAiEventConverter::new(Some("s".into()));
        let mut out = Vec::new();
        for data in [
            chunk(json!([{"index": 0, "delta": {"role": "assistant", "content": ""}}])),
            chunk(json!([{"index": 0, "delta": {"content": "Hel"}}])),
            chunk(json!([{"index": 0, "delta": {"content": "lo"}}])),
            chunk(json!([{"index": 0, "delta": {}, "finish_reason": "stop"}])),
            json!({"id": "chatcmpl-7", "choices": [], "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}}),
        ] {
            out.extend(converter.convert_event(&event(data)));
        }
        assert_eq!(out.len(), 2);
        assert!(!converter.is_finished());

        out.extend(converter.handle_done());
        let out: Vec<_> = out.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(out[0].text(), Some("Hel"));
        assert_eq!(out[0].remote_id.as_deref(), Some("chatcmpl-7"));
        let last = out.last().unwrap();
        assert_eq!(last.finish_reason(), Some(FinishReason::Stop));
        assert_eq!(last.model_usage, Some(TokenUsage::new(3, 2)));
        assert_eq!(last.session_id.as_deref(), Some("s"));
        assert!(converter.is_finished());
    }

    #[test]
    fn second_choice_text_is_positional() {
        let mut converter = OpenAiEventConverter::default().with_choices(2);
        let out = converter.convert_event(&event(chunk(json!([{"index": 1, "delta": {"content": "B"}}]))));
        let response = out.into_iter().next().unwrap().unwrap();
        assert_eq!(response.results.len(), 2);
        assert!(response.results[0].content.is_none());
        assert_eq!(response.results[1].content.as_deref(), Some("B"));

        let terminal = converter.handle_done().pop().unwrap().unwrap();
        assert_eq!(terminal.results.len(), 2);
    }

    #[test]
    fn tool_call_fragments_are_joined() {
        let mut converter = OpenAiEventConverter::default();
        for data in [
            chunk(json!([{"index": 0, "delta": {"tool_calls": [{"index": 0, "id": "call_1", "type": "function", "function": {"name": "weather", "arguments": ""}}]}}])),
            chunk(json!([{"index": 0, "delta": {"tool_calls": [{"index": 0, "function": {"arguments": "{\"city\":"}}]}}])),
            chunk(json!([{"index": 0, "delta": {"tool_calls": [{"index": 0, "function": {"arguments": "\"Rome\"}"}}]}}])),
            chunk(json!([{"index": 0, "delta": {}, "finish_reason": "tool_calls"}])),
        ] {
            assert!(converter.convert_event(&event(data)).is_empty());
        }
        let terminal = converter.handle_done().pop().unwrap().unwrap();
        assert_eq!(terminal.finish_reason(), Some(FinishReason::FunctionCall));
        let call = terminal.function_calls().next().unwrap();
        assert_eq!(call.id, "call_1");
        assert_eq!(call.name, "weather");
        assert_eq!(call.arguments_object().unwrap(), json!({"city": "Rome"}));
        assert!(terminal.model_usage.is_none());
    }

    #[test]
    fn error_payload_becomes_stream_error() {
        let mut converter = OpenAiEventConverter::default();
        let out = converter.convert_event(&event(json!({"error": {"message": "server overloaded"}})));
        match &out[0] {
            Err(LlmError::StreamError(msg)) => assert!(msg.contains("server overloaded")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn body_ending_without_done_is_truncated() {
        let mut converter = OpenAiEventConverter::default();
        converter.convert_event(&event(chunk(json!([{"index": 0, "delta": {"content": "x"}}]))));
        assert!(matches!(
            converter.handle_stream_end(),
            Some(Err(LlmError::StreamError(_)))
        ));
    }

    #[test]
    fn out_of_range_choice_index_is_a_parse_error() {
        let mut converter = OpenAiEventConverter::new(None).with_choices(2);
        let out = converter.convert_event(&event(chunk(
            json!([{"index": u64::MAX, "delta": {"content": "x"}}]),
        )));
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], Err(LlmError::ParseError(_))));

        let out = converter.convert_event(&event(chunk(json!([{"index": 2, "delta": {"content": "x"}}]))));
        assert!(matches!(out[0], Err(LlmError::ParseError(_))));
    }

    #[test]
    fn terminal_only_fills_seen_choices() {
        let mut converter = OpenAiEventConverter::default().with_choices(3);
        converter.convert_event(&event(chunk(
            json!([{"index": 2, "delta": {"content": "C"}, "finish_reason": "length"}]),
        )));
        let terminal = converter.handle_done().pop().unwrap().unwrap();
        assert_eq!(terminal.results.len(), 3);
        assert!(terminal.results[0].finish_reason.is_none());
        assert_eq!(terminal.results[2].finish_reason, Some(FinishReason::Length));
    }
}
