//! Anthropic configuration

use secrecy::SecretString;

use super::models::AnthropicModel;
use crate::error::LlmError;
use crate::types::ModelConfig;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_API_VERSION: &str = "2023-06-01";
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: SecretString,
    /// Default: `https://api.anthropic.com`
    pub base_url: String,
    /// Default: `claude-3-5-sonnet-latest`
    pub model: String,
    /// `anthropic-version` header. Default: `2023-06-01`
    pub api_version: String,
    /// Optional `anthropic-beta` header value.
    pub beta: Option<String>,
    /// Default: 1000
    pub max_tokens: u32,
    /// Default: 0.0
    pub temperature: f32,
    /// Default: 1.0
    pub top_p: f32,
    /// Default: unset
    pub top_k: Option<u32>,
    /// Sent as `metadata.user_id` when set.
    pub metadata_user_id: Option<String>,
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: AnthropicModel::Claude35Sonnet.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            beta: None,
            max_tokens: 1000,
            temperature: 0.0,
            top_p: 1.0,
            top_k: None,
            metadata_user_id: None,
        }
    }

    /// Read the key from `ANTHROPIC_API_KEY`.
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

    pub fn with_beta(mut self, beta: impl Into<String>) -> Self {
        self.beta = Some(beta.into());
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

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_metadata_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.metadata_user_id = Some(user_id.into());
        self
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
            top_p: Some(self.top_p),
            top_k: self.top_k,
            ..Default::default()
        }
    }
}
