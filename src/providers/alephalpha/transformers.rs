//! Request builders and response parsers for Aleph Alpha
//!
//! Pure functions: no I/O, no clock, no randomness. The same inputs always
//! produce the same body.

use super::config::AlephAlphaConfig;
use super::types::{CompleteRequest, CompleteResponse, SemanticEmbedRequest, SemanticEmbedResponse};
use crate::error::LlmError;
use crate::types::{
    ChatMessage, ChatRequest, ChatResponse, ChatResponseResult, EmbedRequest, EmbedResponse,
    FinishReason, FunctionCallMode, ModelConfig, TokenUsage,
};

/// `semantic_embed` accepts a single prompt of at most this many characters.
pub const MAX_EMBED_CHARS: usize = 512;

const INSTRUCTION: &str = "### Instruction:\n";
const RESPONSE: &str = "### Response:";

/// Render a conversation as one control-model prompt.
///
/// System text comes first, then alternating instruction/response blocks,
/// ending with an open response block for the model to complete.
pub fn render_prompt(messages: &[ChatMessage]) -> Result<String, LlmError> {
    let system: Vec<&str> = messages
        .iter()
        .filter_map(|m| match m {
            ChatMessage::System { content } => Some(content.as_str()),
            _ => None,
        })
        .collect();

    let mut prompt = String::new();
    if !system.is_empty() {
        prompt.push_str(&system.join("\n\n"));
        prompt.push_str("\n\n");
    }
    for message in messages {
        match message {
            ChatMessage::System { .. } => {}
            ChatMessage::User { content, .. } => {
                prompt.push_str(INSTRUCTION);
                prompt.push_str(content);
                prompt.push_str("\n\n");
            }
            ChatMessage::Assistant {
                content,
                function_calls,
                ..
            } => {
                if !function_calls.is_empty() {
                    return Err(LlmError::InvalidInput(
                        "AlephAlpha does not support function calls in the conversation"
                            .to_string(),
                    ));
                }
                prompt.push_str(RESPONSE);
                prompt.push('\n');
                prompt.push_str(content.as_deref().unwrap_or_default());
                prompt.push_str("\n\n");
            }
            ChatMessage::Function { .. } => {
                return Err(LlmError::InvalidInput(
                    "AlephAlpha does not support function result messages".to_string(),
                ));
            }
        }
    }
    prompt.push_str(RESPONSE);
    Ok(prompt)
}

/// Build the `complete` body.
///
/// `model_config` is the effective config (defaults merged with caller values).
/// `end_sequences` is dropped; functions and streaming are rejected.
pub fn build_complete_request(
    request: &ChatRequest,
    model: &str,
    model_config: &ModelConfig,
    config: &AlephAlphaConfig,
) -> Result<CompleteRequest, LlmError> {
    if !request.functions.is_empty() {
        return Err(LlmError::InvalidInput(
            "AlephAlpha does not support function calling".to_string(),
        ));
    }
    if matches!(
        request.function_call,
        Some(FunctionCallMode::Auto | FunctionCallMode::Required | FunctionCallMode::Function { .. })
    ) {
        return Err(LlmError::InvalidInput(
            "AlephAlpha does not support function_call directives".to_string(),
        ));
    }
    if model_config.stream == Some(true) {
        return Err(LlmError::InvalidInput(
            "AlephAlpha does not support streaming".to_string(),
        ));
    }

    Ok(CompleteRequest {
        model: model.to_string(),
        hosting: config.hosting,
        prompt: render_prompt(&request.messages)?,
        maximum_tokens: model_config.max_tokens.unwrap_or(config.max_tokens),
        minimum_tokens: config.min_tokens,
        echo: config.echo,
        temperature: model_config.temperature,
        top_k: model_config.top_k,
        top_p: model_config.top_p,
        presence_penalty: model_config.presence_penalty,
        frequency_penalty: model_config.frequency_penalty,
        sequence_penalty: config.sequence_penalty,
        sequence_penalty_min_length: config.sequence_penalty_min_length,
        repetition_penalties_include_completion: config.repetition_penalties_include_completion,
        use_multiplicative_presence_penalty: config.use_multiplicative_presence_penalty,
        use_multiplicative_frequency_penalty: config.use_multiplicative_frequency_penalty,
        use_multiplicative_sequence_penalty: config.use_multiplicative_sequence_penalty,
        penalty_bias: config.penalty_bias.clone(),
        penalty_exceptions: config.penalty_exceptions.clone(),
        penalty_exceptions_include_stop_sequences: config
            .penalty_exceptions_include_stop_sequences,
        logit_bias: config.logit_bias.clone(),
        completion_bias_inclusion: config.completion_bias_inclusion.clone(),
        completion_bias_inclusion_first_token_only: config
            .completion_bias_inclusion_first_token_only,
        completion_bias_exclusion: config.completion_bias_exclusion.clone(),
        completion_bias_exclusion_first_token_only: config
            .completion_bias_exclusion_first_token_only,
        best_of: config.best_of,
        n: model_config.n,
        log_probs: config.log_probs,
        stop_sequences: model_config
            .stop_sequences
            .clone()
            .filter(|s| !s.is_empty()),
        tokens: config.tokens,
        raw_completion: config.raw_completion,
        disable_optimizations: config.disable_optimizations,
        contextual_control_threshold: config.contextual_control_threshold,
        control_log_additive: config.control_log_additive,
    })
}

pub fn parse_finish_reason(reason: Option<&str>) -> Option<FinishReason> {
    reason.map(|r| match r {
        "maximum_tokens" | "length" => FinishReason::Length,
        _ => FinishReason::Stop,
    })
}

pub fn parse_complete_response(response: CompleteResponse) -> Result<ChatResponse, LlmError> {
    if response.completions.is_empty() {
        return Err(LlmError::ParseError(
            "AlephAlpha response contains no completions".to_string(),
        ));
    }
    let model_usage = match (response.num_tokens_prompt_total, response.num_tokens_generated) {
        (Some(prompt), Some(generated)) => Some(TokenUsage::new(prompt, generated)),
        _ => None,
    };
    Ok(ChatResponse {
        results: response
            .completions
            .into_iter()
            .map(|c| ChatResponseResult {
                content: Some(c.completion),
                finish_reason: parse_finish_reason(c.finish_reason.as_deref())
                    .or(Some(FinishReason::Stop)),
                ..Default::default()
            })
            .collect(),
        model_usage,
        ..Default::default()
    })
}

/// Enforce the single-text, 512-character limit. Never truncates.
pub fn validate_embed_request(request: &EmbedRequest) -> Result<&str, LlmError> {
    let [text] = request.texts.as_slice() else {
        return Err(LlmError::InvalidInput(format!(
            "AlephAlpha limits embeddings input to 1 string, got {}",
            request.texts.len()
        )));
    };
    let chars = text.chars().count();
    if chars > MAX_EMBED_CHARS {
        return Err(LlmError::InvalidInput(format!(
            "AlephAlpha limits embeddings input to {MAX_EMBED_CHARS} characters, got {chars}"
        )));
    }
    Ok(text.as_str())
}

pub fn build_embed_request(
    request: &EmbedRequest,
    model: &str,
    config: &AlephAlphaConfig,
) -> Result<SemanticEmbedRequest, LlmError> {
    let text = validate_embed_request(request)?;
    Ok(SemanticEmbedRequest {
        model: model.to_string(),
        hosting: config.hosting,
        prompt: text.to_string(),
        representation: config.representation,
        compress_to_size: config.compress_to_size,
        normalize: config.normalize,
        contextual_control_threshold: config.contextual_control_threshold,
        control_log_additive: config.control_log_additive,
    })
}

pub fn parse_embed_response(response: SemanticEmbedResponse) -> EmbedResponse {
    EmbedResponse {
        embeddings: vec![response.embedding],
        model_usage: response
            .num_tokens_prompt_total
            .map(|prompt| TokenUsage::new(prompt, 0)),
        ..Default::default()
    }
}
