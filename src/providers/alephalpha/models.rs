//! Aleph Alpha model catalog

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::registry::ModelRegistry;
use crate::types::ModelInfo;

/// Generation models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlephAlphaModel {
    #[serde(rename = "luminous-supreme-control")]
    LuminousSupremeControl,
    #[serde(rename = "luminous-supreme")]
    LuminousSupreme,
    #[serde(rename = "luminous-extended")]
    LuminousExtended,
    #[serde(rename = "luminous-base")]
    LuminousBase,
}

impl AlephAlphaModel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LuminousSupremeControl => "luminous-supreme-control",
            Self::LuminousSupreme => "luminous-supreme",
            Self::LuminousExtended => "luminous-extended",
            Self::LuminousBase => "luminous-base",
        }
    }
}

impl From<AlephAlphaModel> for String {
    fn from(model: AlephAlphaModel) -> Self {
        model.as_str().to_string()
    }
}

/// Embedding models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlephAlphaEmbedModel {
    #[serde(rename = "luminous-explore")]
    LuminousExplore,
}

impl AlephAlphaEmbedModel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LuminousExplore => "luminous-explore",
        }
    }
}

impl From<AlephAlphaEmbedModel> for String {
    fn from(model: AlephAlphaEmbedModel) -> Self {
        model.as_str().to_string()
    }
}

/// How `semantic_embed` should represent the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbedRepresentation {
    Symmetric,
    #[default]
    Document,
    Query,
}

/// Hosting restriction for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hosting {
    /// Only Aleph Alpha's own data centers.
    #[serde(rename = "aleph-alpha")]
    MaxPrivacy,
}

const CONTEXT: u32 = 2048;

pub static MODELS: Lazy<Vec<ModelInfo>> = Lazy::new(|| {
    let eur = |model: &str, per_1m: f64| {
        ModelInfo::new(model)
            .with_currency("eur")
            .with_costs(per_1m, per_1m)
            .with_max_context_tokens(CONTEXT)
    };
    vec![
        eur(AlephAlphaModel::LuminousSupremeControl.as_str(), 43.75),
        eur(AlephAlphaModel::LuminousSupreme.as_str(), 35.0),
        eur(AlephAlphaModel::LuminousExtended.as_str(), 9.0),
        eur(AlephAlphaModel::LuminousBase.as_str(), 6.0),
        eur(AlephAlphaEmbedModel::LuminousExplore.as_str(), 15.0).embedding(),
    ]
});

pub fn registry() -> ModelRegistry {
    ModelRegistry::new(MODELS.as_slice())
}
