//! # unillm
//!
//! A provider-agnostic adapter layer over hosted LLM backends. Callers build a
//! normalized [`ChatRequest`](types::ChatRequest) or
//! [`EmbedRequest`](types::EmbedRequest) and hand it to any adapter
//! implementing [`AiService`](traits::AiService); the adapter translates it
//! into the backend's wire format, performs the call and maps the answer back.
//!
#![deny(unsafe_code)]

//! ## Backends
//!
//! - **Aleph Alpha** (`alephalpha` feature): Luminous completion and semantic embeddings
//! - **Anthropic** (`anthropic` feature): Claude over the Messages API with tools and streaming
//! - **OpenAI** (`openai` feature): Chat Completions with tools and streaming, embeddings
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use unillm::prelude::*;
//! use unillm::providers::anthropic::{AnthropicClient, AnthropicConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), LlmError> {
//!     let client = AnthropicClient::new(AnthropicConfig::from_env()?)?;
//!     let request = ChatRequest::new(vec![ChatMessage::user("Hello!")]);
//!     let response = client.chat(request, ChatOptions::default()).await?.collect().await?;
//!     println!("{}", response.text().unwrap_or_default());
//!     Ok(())
//! }
//! ```
//!
//! ## Hooks
//!
//! [`ServiceOptions`](types::ServiceOptions) carries the per-adapter hooks: a
//! debug flag that logs full bodies, an optional
//! [`RateLimiter`](execution::RateLimiter), a replaceable
//! [`HttpTransport`](execution::HttpTransport) and a
//! [`Tracer`](observability::Tracer).

pub mod core;
pub mod error;
pub mod execution;
pub mod observability;
pub mod providers;
pub mod registry;
pub mod streaming;
pub mod traits;
pub mod types;
pub mod utils;

pub use error::LlmError;

pub mod prelude {
    pub use crate::error::{ErrorCategory, LlmError};
    pub use crate::streaming::{ChatStream, collect_stream};
    pub use crate::traits::{AiService, AiServiceExt, ChatOutput, Features};
    pub use crate::types::{
        ChatMessage, ChatOptions, ChatRequest, ChatResponse, EmbedOptions, EmbedRequest,
        EmbedResponse, FinishReason, FunctionCall, FunctionCallMode, FunctionDefinition,
        FunctionJsonSchema, ModelConfig, ModelInfo, ServiceOptions, TokenUsage,
    };
}
