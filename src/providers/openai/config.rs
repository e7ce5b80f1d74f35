//! OpenAI configuration

use secrecy::SecretString;

use super::models::{OpenAiEmbedModel, OpenAiModel};
use crate::error::LlmError;
use crate::types::ModelConfig;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: SecretString,
    /// Default: `https://api.openai.com/v1`
    pub base_url: String,
    /// Sent as `OpenAI-Organization` when set.
    pub organization: Option<String>,
    /// Default: `gpt-4o-mini`
    pub model: String,
    /// Default: `text-embedding-3-small`
    pub embed_model: String,
    /// Default: 500
    pub max_tokens: u32,
    /// Default: 0.1
    pub temperature: f32,
    /// Default: 0.9
    pub top_p: f32,
    pub presence_penalty: Option<f32>,
    pub frequency_penalty: Option<f32>,
    /// Choices per request. Default: backend default (1)
    pub n: Option<u32>,
    pub seed: Option<i64>,
    /// End-user identifier for abuse monitoring.
    pub user: Option<String>,
    /// Output size for `text-embedding-3-*` models.
    pub embed_dimensions: Option<u32>,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            organization: None,
            model: OpenAiModel::Gpt4oMini.into(),
            embed_model: OpenAiEmbedModel::TextEmbedding3Small.into(),
            max_tokens: 500,
            temperature: 0.1,
            top_p: 0.9,
            presence_penalty: None,
            frequency_penalty: None,
            n: None,
            seed: None,
            user: None,
            embed_dimensions: None,
        }
    }

    /// Read the key from `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self, LlmError> {
        std::env::var(API_KEY_ENV)
            .map(Self::new)
            .map_err(|_| LlmError::ConfigurationError(format!("{API_KEY_ENV} is not set")))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
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

    pub fn with_n(mut self, n: u32) -> Self {
        self.n = Some(n);
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_embed_dimensions(mut self, dimensions: u32) -> Self {
        self.embed_dimensions = Some(dimensions);
        self
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
            top_p: Some(self.top_p),
            presence_penalty: self.presence_penalty,
            frequency_penalty: self.frequency_penalty,
            n: self.n,
            ..Default::default()
        }
    }
}
