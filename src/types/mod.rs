//! Normalized data model shared by every adapter

pub mod chat;
pub mod common;
pub mod config;
pub mod embedding;
pub mod model;
pub mod options;
pub mod tools;

pub use chat::{
    ChatMessage, ChatRequest, ChatResponse, ChatResponseResult, FinishReason, MessageRole,
};
pub use common::ProviderType;
pub use config::ModelConfig;
pub use embedding::{EmbedRequest, EmbedResponse};
pub use model::{ModelInfo, ModelInfoWithProvider, ModelKind, TokenUsage};
pub use options::{ChatOptions, EmbedOptions, ServiceOptions};
pub use tools::{FunctionCall, FunctionCallMode, FunctionDefinition, FunctionJsonSchema};
