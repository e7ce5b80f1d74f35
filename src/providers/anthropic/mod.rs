//! Anthropic adapter
//!
//! Claude models over the Messages API (`/v1/messages`), with tool use and
//! SSE streaming. Anthropic offers no embedding endpoint.

pub mod client;
pub mod config;
pub mod models;
pub mod streaming;
pub mod transformers;
pub mod types;
pub mod utils;

pub use client::AnthropicClient;
pub use config::AnthropicConfig;
pub use models::AnthropicModel;
