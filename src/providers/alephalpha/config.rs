//! Aleph Alpha configuration
//!
//! Every tunable has an explicit default. Values left as `None` are omitted
//! from request bodies so the backend's own default applies.

use std::collections::BTreeMap;

use secrecy::SecretString;

use super::models::{AlephAlphaEmbedModel, AlephAlphaModel, EmbedRepresentation, Hosting};
use crate::error::LlmError;
use crate::types::ModelConfig;

pub const DEFAULT_BASE_URL: &str = "https://api.aleph-alpha.com";
pub const API_KEY_ENV: &str = "ALEPH_ALPHA_API_KEY";

#[derive(Debug, Clone)]
pub struct AlephAlphaConfig {
    pub api_key: SecretString,
    /// Default: `https://api.aleph-alpha.com`
    pub base_url: String,
    /// Generation model. Default: `luminous-supreme`
    pub model: String,
    /// Embedding model. Default: `luminous-explore`
    pub embed_model: String,
    /// Default: unrestricted
    pub hosting: Option<Hosting>,

    /// Default: 300
    pub max_tokens: u32,
    pub min_tokens: Option<u32>,
    /// Return the prompt along with the completion.
    pub echo: Option<bool>,
    /// Default: 0.45
    pub temperature: f32,
    /// Default: 0 (disabled)
    pub top_k: u32,
    /// Default: 1.0
    pub top_p: f32,
    pub presence_penalty: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub sequence_penalty: Option<f32>,
    pub sequence_penalty_min_length: Option<u32>,
    pub repetition_penalties_include_completion: Option<bool>,
    pub use_multiplicative_presence_penalty: Option<bool>,
    pub use_multiplicative_frequency_penalty: Option<bool>,
    pub use_multiplicative_sequence_penalty: Option<bool>,
    pub penalty_bias: Option<String>,
    pub penalty_exceptions: Option<Vec<String>>,
    pub penalty_exceptions_include_stop_sequences: Option<bool>,
    /// Additive bias per token, keyed by the token text.
    pub logit_bias: Option<BTreeMap<String, f32>>,
    /// Restrict sampling to these continuations.
    pub completion_bias_inclusion: Option<Vec<String>>,
    pub completion_bias_inclusion_first_token_only: Option<bool>,
    /// Never sample these continuations.
    pub completion_bias_exclusion: Option<Vec<String>>,
    pub completion_bias_exclusion_first_token_only: Option<bool>,
    pub best_of: Option<u32>,
    /// Completions per prompt. Default: backend default (1)
    pub n: Option<u32>,
    pub log_probs: Option<u32>,
    pub tokens: Option<bool>,
    pub raw_completion: Option<bool>,
    /// Default: true, so the prompt is sent exactly as rendered
    pub disable_optimizations: bool,
    pub contextual_control_threshold: Option<f64>,
    pub control_log_additive: Option<bool>,

    /// Default: `document`
    pub representation: EmbedRepresentation,
    pub compress_to_size: Option<u32>,
    pub normalize: Option<bool>,
}

impl AlephAlphaConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: AlephAlphaModel::LuminousSupreme.into(),
            embed_model: AlephAlphaEmbedModel::LuminousExplore.into(),
            hosting: None,
            max_tokens: 300,
            min_tokens: None,
            echo: None,
            temperature: 0.45,
            top_k: 0,
            top_p: 1.0,
            presence_penalty: None,
            frequency_penalty: None,
            sequence_penalty: None,
            sequence_penalty_min_length: None,
            repetition_penalties_include_completion: None,
            use_multiplicative_presence_penalty: None,
            use_multiplicative_frequency_penalty: None,
            use_multiplicative_sequence_penalty: None,
            penalty_bias: None,
            penalty_exceptions: None,
            penalty_exceptions_include_stop_sequences: None,
            logit_bias: None,
            completion_bias_inclusion: None,
            completion_bias_inclusion_first_token_only: None,
            completion_bias_exclusion: None,
            completion_bias_exclusion_first_token_only: None,
            best_of: None,
            n: None,
            log_probs: None,
            tokens: None,
            raw_completion: None,
            disable_optimizations: true,
            contextual_control_threshold: None,
            control_log_additive: None,
            representation: EmbedRepresentation::Document,
            compress_to_size: None,
            normalize: None,
        }
    }

    /// Defaults tuned for more varied output.
    pub fn creative(api_key: impl Into<String>) -> Self {
        Self::new(api_key).with_temperature(0.9)
    }

    /// Read the key from `ALEPH_ALPHA_API_KEY`.
    pub fn from_env() -> Result<Self, LlmError> {
        std::env::var(API_KEY_ENV)
            .map(Self::new)
            .map_err(|_| LlmError::ConfigurationError(format!("{API_KEY_ENV} is not set")))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_embed_model(mut self, model: impl Into<String>) -> Self {
        self.embed_model = model.into();
        self
    }

    pub fn with_hosting(mut self, hosting: Hosting) -> Self {
        self.hosting = Some(hosting);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_representation(mut self, representation: EmbedRepresentation) -> Self {
        self.representation = representation;
        self
    }

    pub fn with_compress_to_size(mut self, size: u32) -> Self {
        self.compress_to_size = Some(size);
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = Some(normalize);
        self
    }

    pub fn with_logit_bias<K: Into<String>>(
        mut self,
        bias: impl IntoIterator<Item = (K, f32)>,
    ) -> Self {
        self.logit_bias = Some(bias.into_iter().map(|(k, v)| (k.into(), v)).collect());
        self
    }

    /// Only sample continuations from `allowed`. With `first_token_only`
    /// the restriction applies to the first generated token alone.
    pub fn with_completion_bias_inclusion<S: Into<String>>(
        mut self,
        allowed: impl IntoIterator<Item = S>,
        first_token_only: bool,
    ) -> Self {
        self.completion_bias_inclusion = Some(allowed.into_iter().map(Into::into).collect());
        self.completion_bias_inclusion_first_token_only = Some(first_token_only);
        self
    }

    pub fn with_completion_bias_exclusion<S: Into<String>>(
        mut self,
        excluded: impl IntoIterator<Item = S>,
        first_token_only: bool,
    ) -> Self {
        self.completion_bias_exclusion = Some(excluded.into_iter().map(Into::into).collect());
        self.completion_bias_exclusion_first_token_only = Some(first_token_only);
        self
    }

    pub fn with_disable_optimizations(mut self, disable: bool) -> Self {
        self.disable_optimizations = disable;
        self
    }

    /// The unified view of the tunables above.
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
            top_p: Some(self.top_p),
            top_k: Some(self.top_k),
            presence_penalty: self.presence_penalty,
            frequency_penalty: self.frequency_penalty,
            n: self.n,
            stream: Some(false),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = AlephAlphaConfig::new("k");
        assert_eq!(cfg.model, "luminous-supreme");
        assert_eq!(cfg.embed_model, "luminous-explore");
        assert_eq!(cfg.representation, EmbedRepresentation::Document);
        assert!(cfg.disable_optimizations);

        let mc = cfg.model_config();
        assert_eq!(mc.max_tokens, Some(300));
        assert_eq!(mc.temperature, Some(0.45));
        assert_eq!(mc.top_k, Some(0));
        assert_eq!(mc.top_p, Some(1.0));
    }

    #[test]
    fn creative_preset_only_raises_temperature() {
        let cfg = AlephAlphaConfig::creative("k");
        assert_eq!(cfg.temperature, 0.9);
        assert_eq!(cfg.model, "luminous-supreme");
        assert_eq!(cfg.max_tokens, 300);
    }
}
