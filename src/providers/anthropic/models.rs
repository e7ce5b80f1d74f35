//! Anthropic model catalog

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::registry::ModelRegistry;
use crate::types::ModelInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnthropicModel {
    #[serde(rename = "claude-3-5-sonnet-latest")]
    Claude35Sonnet,
    #[serde(rename = "claude-3-5-haiku-latest")]
    Claude35Haiku,
    #[serde(rename = "claude-3-opus-latest")]
    Claude3Opus,
    #[serde(rename = "claude-3-haiku-20240307")]
    Claude3Haiku,
    #[serde(rename = "claude-2.1")]
    Claude2,
    #[serde(rename = "claude-instant-1.2")]
    ClaudeInstant,
}

impl AnthropicModel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Claude35Sonnet => "claude-3-5-sonnet-latest",
            Self::Claude35Haiku => "claude-3-5-haiku-latest",
            Self::Claude3Opus => "claude-3-opus-latest",
            Self::Claude3Haiku => "claude-3-haiku-20240307",
            Self::Claude2 => "claude-2.1",
            Self::ClaudeInstant => "claude-instant-1.2",
        }
    }
}

impl From<AnthropicModel> for String {
    fn from(model: AnthropicModel) -> Self {
        model.as_str().to_string()
    }
}

pub static MODELS: Lazy<Vec<ModelInfo>> = Lazy::new(|| {
    let usd = |model: AnthropicModel, prompt: f64, completion: f64, context: u32| {
        ModelInfo::new(model.as_str())
            .with_currency("usd")
            .with_costs(prompt, completion)
            .with_max_context_tokens(context)
    };
    vec![
        usd(AnthropicModel::Claude35Sonnet, 3.0, 15.0, 200_000)
            .with_aliases(["claude-3-5-sonnet-20241022"]),
        usd(AnthropicModel::Claude35Haiku, 0.8, 4.0, 200_000)
            .with_aliases(["claude-3-5-haiku-20241022"]),
        usd(AnthropicModel::Claude3Opus, 15.0, 75.0, 200_000)
            .with_aliases(["claude-3-opus-20240229"]),
        usd(AnthropicModel::Claude3Haiku, 0.25, 1.25, 200_000).with_aliases(["claude-3-haiku"]),
        usd(AnthropicModel::Claude2, 11.02, 32.68, 100_000).with_aliases(["claude-2"]),
        usd(AnthropicModel::ClaudeInstant, 1.63, 5.51, 100_000).with_aliases(["claude-instant"]),
    ]
});

pub fn registry() -> ModelRegistry {
    ModelRegistry::new(MODELS.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_short_names_resolve_to_versioned_models() {
        assert_eq!(registry().resolve("claude-2").unwrap().name, "claude-2.1");
        assert_eq!(
            registry().resolve("claude-instant").unwrap().name,
            "claude-instant-1.2"
        );
        assert_eq!(
            registry().resolve("claude-2").unwrap().max_context_tokens,
            Some(100_000)
        );
    }
}
