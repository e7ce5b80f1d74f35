//! Common types and enums used across the library

use serde::{Deserialize, Serialize};

/// Backends this crate ships adapters for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    AlephAlpha,
    Anthropic,
    OpenAi,
}

impl ProviderType {
    /// Stable backend identifier.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AlephAlpha => "alephalpha",
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
        }
    }

    /// Human-facing backend name.
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::AlephAlpha => "AlephAlpha",
            Self::Anthropic => "Anthropic",
            Self::OpenAi => "OpenAI",
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderType {
    type Err = crate::error::LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "alephalpha" | "aleph-alpha" | "aleph_alpha" => Ok(Self::AlephAlpha),
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            other => Err(crate::error::LlmError::ConfigurationError(format!(
                "Unknown provider: {other}"
            ))),
        }
    }
}
