//! OpenAI adapter
//!
//! Chat Completions (`/chat/completions`) with tools and streaming, plus
//! embeddings (`/embeddings`).

pub mod client;
pub mod config;
pub mod models;
pub mod streaming;
pub mod transformers;
pub mod types;

pub use client::OpenAiClient;
pub use config::OpenAiConfig;
pub use models::{OpenAiEmbedModel, OpenAiModel};
