//! Request builders and response parsers for OpenAI chat and embeddings

use super::config::OpenAiConfig;
use super::types::{
    ChatCompletionRequest, ChatCompletionResponse, EmbeddingRequest, EmbeddingResponse,
    NamedFunction, OpenAiFunctionCall, OpenAiFunctionDefinition, OpenAiMessage, OpenAiRole,
    OpenAiTool, OpenAiToolCall, OpenAiToolChoice, OpenAiUsage, StreamOptions,
};
use crate::error::LlmError;
use crate::types::{
    ChatMessage, ChatRequest, ChatResponse, ChatResponseResult, EmbedRequest, EmbedResponse,
    FinishReason, FunctionCall, FunctionCallMode, ModelConfig, TokenUsage,
};

pub fn convert_messages(messages: &[ChatMessage]) -> Vec<OpenAiMessage> {
    messages
        .iter()
        .map(|message| match message {
            ChatMessage::System { content } => OpenAiMessage {
                role: OpenAiRole::System,
                content: Some(content.clone()),
                name: None,
                tool_calls: None,
                tool_call_id: None,
            },
            ChatMessage::User { content, name } => OpenAiMessage {
                role: OpenAiRole::User,
                content: Some(content.clone()),
                name: name.clone(),
                tool_calls: None,
                tool_call_id: None,
            },
            ChatMessage::Assistant {
                content,
                name,
                function_calls,
            } => OpenAiMessage {
                role: OpenAiRole::Assistant,
                content: content.clone(),
                name: name.clone(),
                tool_calls: (!function_calls.is_empty()).then(|| {
                    function_calls
                        .iter()
                        .map(|call| OpenAiToolCall {
                            id: call.id.clone(),
                            call_type: "function".to_string(),
                            function: OpenAiFunctionCall {
                                name: call.name.clone(),
                                arguments: call.arguments_string(),
                            },
                        })
                        .collect()
                }),
                tool_call_id: None,
            },
            ChatMessage::Function {
                content,
                function_id,
            } => OpenAiMessage {
                role: OpenAiRole::Tool,
                content: Some(content.clone()),
                name: None,
                tool_calls: None,
                tool_call_id: Some(function_id.clone()),
            },
        })
        .collect()
}

pub fn convert_tool_choice(mode: &FunctionCallMode) -> OpenAiToolChoice {
    match mode {
        FunctionCallMode::None => OpenAiToolChoice::Mode("none"),
        FunctionCallMode::Auto => OpenAiToolChoice::Mode("auto"),
        FunctionCallMode::Required => OpenAiToolChoice::Mode("required"),
        FunctionCallMode::Function { name } => OpenAiToolChoice::Function {
            tool_type: "function",
            function: NamedFunction { name: name.clone() },
        },
    }
}

/// Build the `/chat/completions` body. `top_k` and `end_sequences` are dropped.
pub fn build_chat_request(
    request: &ChatRequest,
    model: &str,
    model_config: &ModelConfig,
    config: &OpenAiConfig,
    stream: bool,
) -> Result<ChatCompletionRequest, LlmError> {
    if model_config.n == Some(0) {
        return Err(LlmError::InvalidInput("n must be at least 1".to_string()));
    }
    let tools = (!request.functions.is_empty()).then(|| {
        request
            .functions
            .iter()
            .map(|f| OpenAiTool {
                tool_type: "function",
                function: OpenAiFunctionDefinition {
                    name: f.name.clone(),
                    description: f.description.clone(),
                    parameters: f.parameters_json(),
                },
            })
            .collect::<Vec<_>>()
    });
    // a directive without tools is meaningless to the API
    let tool_choice = tools
        .as_ref()
        .and(request.function_call.as_ref())
        .map(convert_tool_choice);

    Ok(ChatCompletionRequest {
        model: model.to_string(),
        messages: convert_messages(&request.messages),
        max_tokens: model_config.max_tokens,
        temperature: model_config.temperature,
        top_p: model_config.top_p,
        presence_penalty: model_config.presence_penalty,
        frequency_penalty: model_config.frequency_penalty,
        stop: model_config
            .stop_sequences
            .clone()
            .filter(|s| !s.is_empty()),
        n: model_config.n,
        stream: stream.then_some(true),
        stream_options: stream.then_some(StreamOptions {
            include_usage: true,
        }),
        seed: config.seed,
        user: config.user.clone(),
        tools,
        tool_choice,
    })
}

pub fn parse_finish_reason(reason: Option<&str>) -> Option<FinishReason> {
    reason.map(|r| match r {
        "length" => FinishReason::Length,
        "tool_calls" | "function_call" => FinishReason::FunctionCall,
        "content_filter" => FinishReason::ContentFilter,
        _ => FinishReason::Stop,
    })
}

pub fn parse_usage(usage: Option<OpenAiUsage>) -> Option<TokenUsage> {
    usage.map(|u| TokenUsage::from_reported(u.prompt_tokens, u.completion_tokens, u.total_tokens))
}

pub fn convert_tool_calls(calls: Option<Vec<OpenAiToolCall>>) -> Vec<FunctionCall> {
    calls
        .unwrap_or_default()
        .into_iter()
        .map(|c| FunctionCall::new(c.id, c.function.name, Some(serde_json::Value::String(c.function.arguments))))
        .collect()
}

pub fn parse_chat_response(response: ChatCompletionResponse) -> Result<ChatResponse, LlmError> {
    if response.choices.is_empty() {
        return Err(LlmError::ParseError(
            "OpenAI response contains no choices".to_string(),
        ));
    }
    let mut choices = response.choices;
    choices.sort_by_key(|c| c.index);
    Ok(ChatResponse {
        remote_id: Some(response.id),
        results: choices
            .into_iter()
            .map(|choice| ChatResponseResult {
                content: choice.message.content,
                name: choice.message.name,
                id: Some(choice.index.to_string()),
                function_calls: convert_tool_calls(choice.message.tool_calls),
                finish_reason: parse_finish_reason(choice.finish_reason.as_deref()),
            })
            .collect(),
        model_usage: parse_usage(response.usage),
        ..Default::default()
    })
}

pub fn build_embed_request(
    request: &EmbedRequest,
    model: &str,
    config: &OpenAiConfig,
) -> Result<EmbeddingRequest, LlmError> {
    if request.texts.is_empty() {
        return Err(LlmError::InvalidInput(
            "Embedding request needs at least one text".to_string(),
        ));
    }
    Ok(EmbeddingRequest {
        model: model.to_string(),
        input: request.texts.clone(),
        dimensions: config.embed_dimensions,
        user: config.user.clone(),
    })
}

/// Order vectors by `index` and check they line up with the inputs.
pub fn parse_embed_response(
    response: EmbeddingResponse,
    expected: usize,
) -> Result<EmbedResponse, LlmError> {
    if response.data.len() != expected {
        return Err(LlmError::ParseError(format!(
            "OpenAI returned {} embeddings for {expected} inputs",
            response.data.len()
        )));
    }
    let mut data = response.data;
    data.sort_by_key(|d| d.index);
    if data.iter().enumerate().any(|(i, d)| d.index != i) {
        return Err(LlmError::ParseError(
            "OpenAI embedding indices do not cover every input".to_string(),
        ));
    }
    Ok(EmbedResponse {
        embeddings: data.into_iter().map(|d| d.embedding).collect(),
        model_usage: parse_usage(response.usage),
        ..Default::default()
    })
}
