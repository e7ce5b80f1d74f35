//! Model Info Registry
//!
//! Static cost/capability tables keyed by model identifier. Each adapter owns one
//! catalog (a `Lazy<Vec<ModelInfo>>` compiled into the binary) and wraps it in a
//! `ModelRegistry` for lookups. Entries never change after startup.

use crate::error::LlmError;
use crate::types::{ModelInfo, ModelKind};

/// Read-only view over one backend's model catalog.
#[derive(Debug, Clone, Copy)]
pub struct ModelRegistry {
    models: &'static [ModelInfo],
}

impl ModelRegistry {
    pub const fn new(models: &'static [ModelInfo]) -> Self {
        Self { models }
    }

    pub fn models(&self) -> &'static [ModelInfo] {
        self.models
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.models.iter().map(|m| m.name.as_str())
    }

    /// Resolve by exact name first, then by alias.
    pub fn resolve(&self, id: &str) -> Option<&'static ModelInfo> {
        self.models
            .iter()
            .find(|m| m.name == id)
            .or_else(|| self.models.iter().find(|m| m.has_alias(id)))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.resolve(id).is_some()
    }

    /// Resolve or fail with a configuration error naming the backend.
    pub fn require(&self, provider: &str, id: &str) -> Result<&'static ModelInfo, LlmError> {
        self.resolve(id).ok_or_else(|| {
            LlmError::ConfigurationError(format!(
                "{provider}: model '{id}' is not in the catalog (known: {})",
                self.names().collect::<Vec<_>>().join(", ")
            ))
        })
    }

    /// Like [`require`](Self::require), but the entry must also be of `kind`.
    pub fn require_kind(
        &self,
        provider: &str,
        id: &str,
        kind: ModelKind,
    ) -> Result<&'static ModelInfo, LlmError> {
        let info = self.require(provider, id)?;
        if info.kind != kind {
            return Err(LlmError::ConfigurationError(format!(
                "{provider}: model '{id}' is a {} model, expected {kind}",
                info.kind
            )));
        }
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    static CATALOG: Lazy<Vec<ModelInfo>> = Lazy::new(|| {
        vec![
            ModelInfo::new("model-a").with_aliases(["a", "shared"]),
            ModelInfo::new("model-b").with_aliases(["b"]),
            // exact name of one entry beats alias of another
            ModelInfo::new("shared"),
            ModelInfo::new("vectors").embedding(),
        ]
    });

    fn registry() -> ModelRegistry {
        ModelRegistry::new(CATALOG.as_slice())
    }

    #[test]
    fn resolves_exact_name_then_alias() {
        assert_eq!(registry().resolve("model-b").unwrap().name, "model-b");
        assert_eq!(registry().resolve("a").unwrap().name, "model-a");
        assert_eq!(registry().resolve("shared").unwrap().name, "shared");
    }

    #[test]
    fn unknown_model_is_a_configuration_error() {
        let err = registry().require("test", "model-z").unwrap_err();
        match err {
            LlmError::ConfigurationError(msg) => {
                assert!(msg.contains("model-z"));
                assert!(msg.contains("model-a"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn require_kind_rejects_the_other_kind() {
        assert_eq!(
            registry().require_kind("test", "vectors", ModelKind::Embedding).unwrap().name,
            "vectors"
        );
        let err = registry().require_kind("test", "vectors", ModelKind::Chat).unwrap_err();
        assert!(matches!(err, LlmError::ConfigurationError(ref m) if m.contains("embedding")));
        assert!(registry().require_kind("test", "b", ModelKind::Embedding).is_err());
    }
}
