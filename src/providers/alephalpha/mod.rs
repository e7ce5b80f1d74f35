//! Aleph Alpha adapter
//!
//! Luminous completion and semantic embedding over `complete` and
//! `semantic_embed`. Chat turns are rendered into a single control-model
//! prompt; function calling and streaming are not available.

pub mod client;
pub mod config;
pub mod models;
pub mod transformers;
pub mod types;

pub use client::AlephAlphaClient;
pub use config::AlephAlphaConfig;
pub use models::{AlephAlphaEmbedModel, AlephAlphaModel, EmbedRepresentation, Hosting};
