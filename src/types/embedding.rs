//! Normalized embedding request and response types

use serde::{Deserialize, Serialize};

use super::model::{ModelInfoWithProvider, TokenUsage};

/// Texts to embed in one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EmbedRequest {
    /// One vector is returned per entry, in the same order.
    pub texts: Vec<String>,
    /// Use this embedding model instead of the adapter's selected one for this call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_model_info: Option<ModelInfoWithProvider>,
}

impl EmbedRequest {
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().map(Into::into).collect(),
            embed_model_info: None,
        }
    }

    pub fn with_embed_model_info(mut self, info: ModelInfoWithProvider) -> Self {
        self.embed_model_info = Some(info);
        self
    }
}

/// Vectors positionally aligned with the request's texts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EmbedResponse {
    /// Backend-assigned id, when the backend returns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    /// Echo of [`EmbedOptions::session_id`](super::EmbedOptions).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub embeddings: Vec<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_usage: Option<TokenUsage>,
}

impl EmbedResponse {
    pub fn dimension(&self) -> Option<usize> {
        self.embeddings.first().map(Vec::len)
    }
}
