//! OpenAI model catalog

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::registry::ModelRegistry;
use crate::types::ModelInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpenAiModel {
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "gpt-4-turbo")]
    Gpt4Turbo,
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
}

impl OpenAiModel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gpt4o => "gpt-4o",
            Self::Gpt4oMini => "gpt-4o-mini",
            Self::Gpt4Turbo => "gpt-4-turbo",
            Self::Gpt35Turbo => "gpt-3.5-turbo",
        }
    }
}

impl From<OpenAiModel> for String {
    fn from(model: OpenAiModel) -> Self {
        model.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpenAiEmbedModel {
    #[serde(rename = "text-embedding-3-small")]
    TextEmbedding3Small,
    #[serde(rename = "text-embedding-3-large")]
    TextEmbedding3Large,
    #[serde(rename = "text-embedding-ada-002")]
    TextEmbeddingAda002,
}

impl OpenAiEmbedModel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TextEmbedding3Small => "text-embedding-3-small",
            Self::TextEmbedding3Large => "text-embedding-3-large",
            Self::TextEmbeddingAda002 => "text-embedding-ada-002",
        }
    }
}

impl From<OpenAiEmbedModel> for String {
    fn from(model: OpenAiEmbedModel) -> Self {
        model.as_str().to_string()
    }
}

pub static MODELS: Lazy<Vec<ModelInfo>> = Lazy::new(|| {
    let usd = |name: &str, prompt: f64, completion: f64, context: u32| {
        ModelInfo::new(name)
            .with_currency("usd")
            .with_costs(prompt, completion)
            .with_max_context_tokens(context)
    };
    vec![
        usd(OpenAiModel::Gpt4o.as_str(), 2.5, 10.0, 128_000).with_aliases(["gpt-4o-2024-08-06"]),
        usd(OpenAiModel::Gpt4oMini.as_str(), 0.15, 0.6, 128_000)
            .with_aliases(["gpt-4o-mini-2024-07-18"]),
        usd(OpenAiModel::Gpt4Turbo.as_str(), 10.0, 30.0, 128_000)
            .with_aliases(["gpt-4-turbo-2024-04-09"]),
        usd(OpenAiModel::Gpt35Turbo.as_str(), 0.5, 1.5, 16_385)
            .with_aliases(["gpt-3.5-turbo-0125"]),
        usd(OpenAiEmbedModel::TextEmbedding3Small.as_str(), 0.02, 0.0, 8_191).embedding(),
        usd(OpenAiEmbedModel::TextEmbedding3Large.as_str(), 0.13, 0.0, 8_191).embedding(),
        usd(OpenAiEmbedModel::TextEmbeddingAda002.as_str(), 0.1, 0.0, 8_191).embedding(),
    ]
});

pub fn registry() -> ModelRegistry {
    ModelRegistry::new(MODELS.as_slice())
}
