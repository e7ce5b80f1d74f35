//! Model metadata and token accounting

use serde::{Deserialize, Serialize};

/// What a catalog entry can be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Text generation through `chat`.
    #[default]
    Chat,
    /// Vector output through `embed`.
    Embedding,
}

impl ModelKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Embedding => "embedding",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static metadata for one named model.
///
/// Cost figures are display data captured when the catalog was written; adapters
/// never use them to bill or throttle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelInfo {
    /// Canonical identifier sent on the wire.
    pub name: String,
    #[serde(default)]
    pub kind: ModelKind,
    /// ISO currency code of the cost figures, lowercase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Backend counts characters rather than tokens.
    #[serde(default)]
    pub character_is_token: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_token_cost_per_1m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_token_cost_per_1m: Option<f64>,
    /// Prompt plus completion limit, in the backend's units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_context_tokens: Option<u32>,
    /// Dated snapshots and other ids that resolve to this entry.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl ModelInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Prompt/completion costs per one million tokens.
    pub fn with_costs(mut self, prompt_per_1m: f64, completion_per_1m: f64) -> Self {
        self.prompt_token_cost_per_1m = Some(prompt_per_1m);
        self.completion_token_cost_per_1m = Some(completion_per_1m);
        self
    }

    pub fn with_max_context_tokens(mut self, tokens: u32) -> Self {
        self.max_context_tokens = Some(tokens);
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Mark this entry as an embedding model.
    pub fn embedding(mut self) -> Self {
        self.kind = ModelKind::Embedding;
        self
    }

    pub fn is_embedding(&self) -> bool {
        self.kind == ModelKind::Embedding
    }

    pub fn character_is_token(mut self) -> Self {
        self.character_is_token = true;
        self
    }

    pub fn has_alias(&self, id: &str) -> bool {
        self.aliases.iter().any(|a| a == id)
    }

    /// Estimated cost of a call in this model's currency.
    ///
    /// `None` when the catalog carries no cost figures for the model.
    pub fn estimate_cost(&self, usage: &TokenUsage) -> Option<f64> {
        let prompt = self.prompt_token_cost_per_1m?;
        let completion = self.completion_token_cost_per_1m.unwrap_or(0.0);
        Some(
            (f64::from(usage.prompt_tokens) * prompt
                + f64::from(usage.completion_tokens) * completion)
                / 1_000_000.0,
        )
    }

    pub fn with_provider(self, provider: impl Into<String>) -> ModelInfoWithProvider {
        ModelInfoWithProvider {
            info: self,
            provider: provider.into(),
        }
    }
}

/// Model metadata tagged with the backend that serves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfoWithProvider {
    #[serde(flatten)]
    pub info: ModelInfo,
    /// Lowercase backend tag, e.g. `openai`.
    pub provider: String,
}

impl std::ops::Deref for ModelInfoWithProvider {
    type Target = ModelInfo;

    fn deref(&self) -> &Self::Target {
        &self.info
    }
}

/// Input/output units consumed by one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    /// Always `prompt_tokens + completion_tokens`.
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Usage with `total_tokens` derived from its parts.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }

    /// Normalize counts reported by a backend.
    ///
    /// The total is always recomputed from its parts; a disagreeing reported
    /// total is logged and dropped.
    pub fn from_reported(prompt_tokens: u32, completion_tokens: u32, total: Option<u32>) -> Self {
        let usage = Self::new(prompt_tokens, completion_tokens);
        if let Some(total) = total
            && total != usage.total_tokens
        {
            tracing::debug!(
                target: "unillm::usage",
                reported = total,
                computed = usage.total_tokens,
                "backend total_tokens disagrees with prompt + completion"
            );
        }
        usage
    }
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(rhs.prompt_tokens);
        self.completion_tokens = self.completion_tokens.saturating_add(rhs.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(rhs.total_tokens);
    }
}
