//! Normalized chat request and response types

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::config::ModelConfig;
use super::model::{ModelInfoWithProvider, TokenUsage};
use super::tools::{FunctionCall, FunctionCallMode, FunctionDefinition};
use crate::error::LlmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Function,
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    System {
        content: String,
    },
    User {
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Assistant {
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        function_calls: Vec<FunctionCall>,
    },
    /// Result of a function the model asked for, keyed by the call id.
    Function {
        content: String,
        function_id: String,
    },
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
            name: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: Some(content.into()),
            name: None,
            function_calls: Vec::new(),
        }
    }

    /// Assistant turn that only requests function calls.
    pub fn assistant_calls(function_calls: Vec<FunctionCall>) -> Self {
        Self::Assistant {
            content: None,
            name: None,
            function_calls,
        }
    }

    pub fn function_result(function_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Function {
            content: content.into(),
            function_id: function_id.into(),
        }
    }

    pub fn role(&self) -> MessageRole {
        match self {
            Self::System { .. } => MessageRole::System,
            Self::User { .. } => MessageRole::User,
            Self::Assistant { .. } => MessageRole::Assistant,
            Self::Function { .. } => MessageRole::Function,
        }
    }

    /// Text content of the turn, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::System { content } | Self::User { content, .. } | Self::Function { content, .. } => {
                Some(content)
            }
            Self::Assistant { content, .. } => content.as_deref(),
        }
    }
}

/// Normalized chat request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChatRequest {
    /// Conversation turns in order; adapters never reorder them.
    pub messages: Vec<ChatMessage>,
    /// Functions the model may call. Rejected by backends without function support.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCallMode>,
    /// Overlaid on the adapter's defaults for this call only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_config: Option<ModelConfig>,
    /// Use this model instead of the adapter's selected one for this call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_info: Option<ModelInfoWithProvider>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_functions(mut self, functions: Vec<FunctionDefinition>) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_function_call(mut self, mode: FunctionCallMode) -> Self {
        self.function_call = Some(mode);
        self
    }

    pub fn with_model_config(mut self, config: ModelConfig) -> Self {
        self.model_config = Some(config);
        self
    }

    pub fn with_model_info(mut self, info: ModelInfoWithProvider) -> Self {
        self.model_info = Some(info);
        self
    }

    /// Backend-independent checks every adapter runs before translating.
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.messages.is_empty() {
            return Err(LlmError::InvalidInput(
                "Chat request must contain at least one message".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for f in &self.functions {
            if f.name.trim().is_empty() {
                return Err(LlmError::InvalidInput(
                    "Function name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(f.name.as_str()) {
                return Err(LlmError::InvalidInput(format!(
                    "Duplicate function declaration: {}",
                    f.name
                )));
            }
        }

        match &self.function_call {
            Some(FunctionCallMode::Function { name }) if !seen.contains(name.as_str()) => {
                Err(LlmError::InvalidInput(format!(
                    "function_call names undeclared function '{name}'"
                )))
            }
            Some(FunctionCallMode::Required) if self.functions.is_empty() => {
                Err(LlmError::InvalidInput(
                    "function_call 'required' needs at least one function declaration"
                        .to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    FunctionCall,
    ContentFilter,
    Error,
}

/// One completion choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChatResponseResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Speaker name, for backends that report one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub function_calls: Vec<FunctionCall>,
    /// Unset on partial streaming fragments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

impl ChatResponseResult {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }
}

/// Normalized chat response (or one fragment of a streamed response).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChatResponse {
    /// Echo of [`ChatOptions::session_id`](super::ChatOptions).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Backend-assigned message or completion id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    /// One entry per choice, indexed by position.
    pub results: Vec<ChatResponseResult>,
    /// Absent on streamed fragments other than the last.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_usage: Option<TokenUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_model_usage: Option<TokenUsage>,
}

impl ChatResponse {
    /// Text of the first result.
    pub fn text(&self) -> Option<&str> {
        self.results.first().and_then(|r| r.content.as_deref())
    }

    /// Finish reason of the first result.
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.results.first().and_then(|r| r.finish_reason)
    }

    /// Function calls across all results, in result order.
    pub fn function_calls(&self) -> impl Iterator<Item = &FunctionCall> {
        self.results.iter().flat_map(|r| r.function_calls.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_serialize_with_role_tag() {
        let value = serde_json::to_value(ChatMessage::function_result("call_1", "42")).unwrap();
        assert_eq!(value["role"], "function");
        assert_eq!(value["function_id"], "call_1");
    }

    #[test]
    fn validate_rejects_empty_conversation() {
        let err = ChatRequest::default().validate().unwrap_err();
        assert!(matches!(err, LlmError::InvalidInput(_)));
    }

    #[test]
    fn validate_checks_function_directive_targets() {
        let base = ChatRequest::new(vec![ChatMessage::user("hi")])
            .with_functions(vec![FunctionDefinition::new("weather", "Get weather")]);

        assert!(
            base.clone()
                .with_function_call(FunctionCallMode::function("weather"))
                .validate()
                .is_ok()
        );
        assert!(
            base.clone()
                .with_function_call(FunctionCallMode::function("stocks"))
                .validate()
                .is_err()
        );
        assert!(
            ChatRequest::new(vec![ChatMessage::user("hi")])
                .with_function_call(FunctionCallMode::Required)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn validate_rejects_duplicate_functions() {
        let req = ChatRequest::new(vec![ChatMessage::user("hi")]).with_functions(vec![
            FunctionDefinition::new("f", "a"),
            FunctionDefinition::new("f", "b"),
        ]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn finish_reason_uses_snake_case_tags() {
        assert_eq!(
            serde_json::to_value(FinishReason::FunctionCall).unwrap(),
            "function_call"
        );
        assert_eq!(
            serde_json::to_value(FinishReason::ContentFilter).unwrap(),
            "content_filter"
        );
    }
}
