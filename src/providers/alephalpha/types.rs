//! Aleph Alpha wire types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::models::{EmbedRepresentation, Hosting};

/// Body of `POST /complete`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompleteRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosting: Option<Hosting>,
    pub prompt: String,
    pub maximum_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub echo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_penalty_min_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_penalties_include_completion: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_multiplicative_presence_penalty: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_multiplicative_frequency_penalty: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_multiplicative_sequence_penalty: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalty_bias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalty_exceptions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalty_exceptions_include_stop_sequences: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<BTreeMap<String, f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_bias_inclusion: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_bias_inclusion_first_token_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_bias_exclusion: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_bias_exclusion_first_token_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_of: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_probs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_completion: Option<bool>,
    pub disable_optimizations: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contextual_control_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_log_additive: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompleteResponse {
    #[serde(default)]
    pub model_version: Option<String>,
    pub completions: Vec<Completion>,
    #[serde(default)]
    pub num_tokens_prompt_total: Option<u32>,
    #[serde(default)]
    pub num_tokens_generated: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Completion {
    pub completion: String,
    #[serde(default)]
    pub raw_completion: Option<String>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Body of `POST /semantic_embed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticEmbedRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosting: Option<Hosting>,
    pub prompt: String,
    pub representation: EmbedRepresentation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compress_to_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contextual_control_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_log_additive: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SemanticEmbedResponse {
    #[serde(default)]
    pub model_version: Option<String>,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub num_tokens_prompt_total: Option<u32>,
}
