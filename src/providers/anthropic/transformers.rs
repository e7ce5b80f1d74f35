//! Request builders and response parsers for the Anthropic Messages API

use super::config::AnthropicConfig;
use super::types::{
    AnthropicMessage, AnthropicMetadata, AnthropicRole, AnthropicTool, ContentBlock,
    MessagesRequest, MessagesResponse, ResponseContentBlock,
};
use super::utils::{convert_tool_choice, parse_finish_reason};
use crate::error::LlmError;
use crate::types::{
    ChatMessage, ChatRequest, ChatResponse, ChatResponseResult, FinishReason, FunctionCall,
    FunctionCallMode, ModelConfig, TokenUsage,
};

/// Split off system turns and convert the rest into content-block messages.
///
/// System text is joined with blank lines. Consecutive function results share
/// one user turn.
pub fn convert_messages(
    messages: &[ChatMessage],
) -> Result<(Option<String>, Vec<AnthropicMessage>), LlmError> {
    let mut system = Vec::new();
    let mut converted: Vec<AnthropicMessage> = Vec::new();

    for message in messages {
        match message {
            ChatMessage::System { content } => system.push(content.as_str()),
            ChatMessage::User { content, .. } => converted.push(AnthropicMessage {
                role: AnthropicRole::User,
                content: vec![ContentBlock::Text {
                    text: content.clone(),
                }],
            }),
            ChatMessage::Assistant {
                content,
                function_calls,
                ..
            } => {
                let mut blocks = Vec::new();
                if let Some(text) = content.as_deref().filter(|t| !t.is_empty()) {
                    blocks.push(ContentBlock::Text {
                        text: text.to_string(),
                    });
                }
                for call in function_calls {
                    let input = call.arguments_object().map_err(|e| {
                        LlmError::InvalidInput(format!(
                            "Arguments of function call '{}' are not valid JSON: {e}",
                            call.id
                        ))
                    })?;
                    blocks.push(ContentBlock::ToolUse {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        input,
                    });
                }
                if blocks.is_empty() {
                    return Err(LlmError::InvalidInput(
                        "Assistant message needs content or function calls".to_string(),
                    ));
                }
                converted.push(AnthropicMessage {
                    role: AnthropicRole::Assistant,
                    content: blocks,
                });
            }
            ChatMessage::Function {
                content,
                function_id,
            } => {
                let block = ContentBlock::ToolResult {
                    tool_use_id: function_id.clone(),
                    content: content.clone(),
                };
                match converted.last_mut() {
                    Some(last)
                        if last.role == AnthropicRole::User
                            && last
                                .content
                                .iter()
                                .all(|b| matches!(b, ContentBlock::ToolResult { .. })) =>
                    {
                        last.content.push(block);
                    }
                    _ => converted.push(AnthropicMessage {
                        role: AnthropicRole::User,
                        content: vec![block],
                    }),
                }
            }
        }
    }

    if converted.is_empty() {
        return Err(LlmError::InvalidInput(
            "Anthropic requires at least one non-system message".to_string(),
        ));
    }
    let system = (!system.is_empty()).then(|| system.join("\n\n"));
    Ok((system, converted))
}

/// Build the `/v1/messages` body.
///
/// Penalties and `end_sequences` are dropped; `n > 1` is rejected.
pub fn build_messages_request(
    request: &ChatRequest,
    model: &str,
    model_config: &ModelConfig,
    config: &AnthropicConfig,
    stream: bool,
) -> Result<MessagesRequest, LlmError> {
    if let Some(n) = model_config.n
        && n > 1
    {
        return Err(LlmError::InvalidInput(format!(
            "Anthropic returns a single completion per request, n = {n} is not supported"
        )));
    }

    let (system, messages) = convert_messages(&request.messages)?;

    let tools_disabled = matches!(request.function_call, Some(FunctionCallMode::None));
    let (tools, tool_choice) = if tools_disabled || request.functions.is_empty() {
        (None, None)
    } else {
        let tools = request
            .functions
            .iter()
            .map(|f| AnthropicTool {
                name: f.name.clone(),
                description: f.description.clone(),
                input_schema: f.parameters_json(),
            })
            .collect();
        (
            Some(tools),
            request.function_call.as_ref().and_then(convert_tool_choice),
        )
    };

    Ok(MessagesRequest {
        model: model.to_string(),
        max_tokens: model_config.max_tokens.unwrap_or(config.max_tokens),
        system,
        messages,
        temperature: model_config.temperature,
        top_p: model_config.top_p,
        top_k: model_config.top_k,
        stop_sequences: model_config
            .stop_sequences
            .clone()
            .filter(|s| !s.is_empty()),
        stream: stream.then_some(true),
        tools,
        tool_choice,
        metadata: config
            .metadata_user_id
            .as_ref()
            .map(|user_id| AnthropicMetadata {
                user_id: user_id.clone(),
            }),
    })
}

pub fn parse_messages_response(response: MessagesResponse) -> ChatResponse {
    let mut text = String::new();
    let mut function_calls = Vec::new();
    for block in response.content {
        match block {
            ResponseContentBlock::Text { text: t } => text.push_str(&t),
            ResponseContentBlock::ToolUse { id, name, input } => {
                function_calls.push(FunctionCall::new(id, name, Some(input)));
            }
            ResponseContentBlock::Other => {}
        }
    }
    let model_usage = response.usage.and_then(|u| match (u.input_tokens, u.output_tokens) {
        (Some(input), Some(output)) => Some(TokenUsage::new(input, output)),
        _ => None,
    });

    ChatResponse {
        remote_id: Some(response.id),
        results: vec![ChatResponseResult {
            content: (!text.is_empty()).then_some(text),
            function_calls,
            finish_reason: parse_finish_reason(response.stop_reason.as_deref())
                .or(Some(FinishReason::Stop)),
            ..Default::default()
        }],
        model_usage,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FunctionDefinition, FunctionJsonSchema};
    use serde_json::json;

    fn config() -> AnthropicConfig {
        AnthropicConfig::new("k")
    }

    fn body(request: &ChatRequest, cfg: &ModelConfig) -> serde_json::Value {
        serde_json::to_value(
            build_messages_request(request, "claude-2.1", cfg, &config(), false).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn newline_stop_sequence_is_the_only_stop_field() {
        let request = ChatRequest::new(vec![ChatMessage::user("Hi")]);
        let cfg = config()
            .model_config()
            .merge(&ModelConfig::new().with_stop_sequences(["\n"]));
        let value = body(&request, &cfg);

        assert_eq!(value["stop_sequences"], json!(["\n"]));
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("stop"));
        assert!(!object.contains_key("end_sequences"));
        assert!(!object.contains_key("stop_sequence"));
    }

    #[test]
    fn system_turns_are_hoisted_and_joined() {
        let request = ChatRequest::new(vec![
            ChatMessage::system("Rule one."),
            ChatMessage::user("Hi"),
            ChatMessage::system("Rule two."),
        ]);
        let value = body(&request, &config().model_config());
        assert_eq!(value["system"], "Rule one.\n\nRule two.");
        assert_eq!(value["messages"].as_array().unwrap().len(), 1);
        assert_eq!(value["messages"][0]["content"][0]["type"], "text");
        assert_eq!(value["max_tokens"], 1000);
        assert!(value.get("stream").is_none());
    }

    #[test]
    fn function_results_share_one_user_turn() {
        let request = ChatRequest::new(vec![
            ChatMessage::user("Weather in Paris and Rome?"),
            ChatMessage::assistant_calls(vec![
                FunctionCall::new("tu_1", "weather", Some(json!("{\"city\":\"Paris\"}"))),
                FunctionCall::new("tu_2", "weather", Some(json!({"city": "Rome"}))),
            ]),
            ChatMessage::function_result("tu_1", "18C"),
            ChatMessage::function_result("tu_2", "24C"),
        ]);
        let value = body(&request, &config().model_config());
        let messages = value["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1]["content"][0]["type"], "tool_use");
        assert_eq!(messages[1]["content"][0]["input"], json!({"city": "Paris"}));
        assert_eq!(messages[2]["role"], "user");
        assert_eq!(messages[2]["content"].as_array().unwrap().len(), 2);
        assert_eq!(messages[2]["content"][1]["tool_use_id"], "tu_2");
    }

    #[test]
    fn tools_follow_function_call_mode() {
        let functions = vec![
            FunctionDefinition::new("weather", "Get weather").with_parameters(
                FunctionJsonSchema::object().with_property(
                    "city",
                    FunctionJsonSchema::scalar("string", "City"),
                    true,
                ),
            ),
        ];
        let base = ChatRequest::new(vec![ChatMessage::user("Hi")]).with_functions(functions);

        let required = body(
            &base.clone().with_function_call(FunctionCallMode::Required),
            &config().model_config(),
        );
        assert_eq!(required["tool_choice"], json!({"type": "any"}));
        assert_eq!(required["tools"][0]["input_schema"]["required"], json!(["city"]));

        let named = body(
            &base.clone().with_function_call(FunctionCallMode::function("weather")),
            &config().model_config(),
        );
        assert_eq!(named["tool_choice"], json!({"type": "tool", "name": "weather"}));

        let none = body(
            &base.with_function_call(FunctionCallMode::None),
            &config().model_config(),
        );
        assert!(none.get("tools").is_none());
        assert!(none.get("tool_choice").is_none());
    }

    #[test]
    fn unsupported_fields_are_dropped_or_rejected() {
        let request = ChatRequest::new(vec![ChatMessage::user("Hi")]);
        let cfg = config().model_config().merge(
            &ModelConfig::new()
                .with_presence_penalty(0.5)
                .with_frequency_penalty(0.5),
        );
        let value = body(&request, &cfg);
        assert!(value.get("presence_penalty").is_none());
        assert!(value.get("frequency_penalty").is_none());

        let err = build_messages_request(
            &request,
            "claude-2.1",
            &cfg.merge(&ModelConfig::new().with_n(2)),
            &config(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, LlmError::InvalidInput(_)));
    }

    #[test]
    fn system_only_conversation_is_rejected() {
        let request = ChatRequest::new(vec![ChatMessage::system("alone")]);
        assert!(
            build_messages_request(&request, "claude-2.1", &config().model_config(), &config(), false)
                .is_err()
        );
    }

    #[test]
    fn builder_is_deterministic() {
        let request = ChatRequest::new(vec![ChatMessage::system("s"), ChatMessage::user("u")])
            .with_functions(vec![FunctionDefinition::new("f", "d")]);
        let cfg = config().model_config();
        let a = serde_json::to_string(&body(&request, &cfg)).unwrap();
        let b = serde_json::to_string(&body(&request, &cfg)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn response_collects_text_calls_and_usage() {
        let raw: MessagesResponse = serde_json::from_value(json!({
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-5-sonnet-20241022",
            "content": [
                {"type": "text", "text": "Checking."},
                {"type": "tool_use", "id": "tu_1", "name": "weather", "input": {"city": "Paris"}},
                {"type": "thinking", "thinking": "hmm"}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 20, "output_tokens": 9}
        }))
        .unwrap();
        let response = parse_messages_response(raw);
        assert_eq!(response.remote_id.as_deref(), Some("msg_01"));
        assert_eq!(response.text(), Some("Checking."));
        assert_eq!(response.finish_reason(), Some(FinishReason::FunctionCall));
        let call = response.function_calls().next().unwrap();
        assert_eq!(call.arguments_object().unwrap(), json!({"city": "Paris"}));
        assert_eq!(response.model_usage, Some(TokenUsage::new(20, 9)));
    }

    #[test]
    fn missing_stop_reason_defaults_to_stop() {
        let raw: MessagesResponse = serde_json::from_value(json!({
            "id": "msg_02",
            "content": [{"type": "text", "text": "Done."}]
        }))
        .unwrap();
        let response = parse_messages_response(raw);
        assert_eq!(response.finish_reason(), Some(FinishReason::Stop));
        assert!(response.model_usage.is_none());
    }
}
