//! Backend adapters
//!
//! One module per hosted backend, each gated by its Cargo feature.

#[cfg(feature = "alephalpha")]
pub mod alephalpha;
#[cfg(feature = "anthropic")]
pub mod anthropic;
#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "alephalpha")]
pub use alephalpha::AlephAlphaClient;
#[cfg(feature = "anthropic")]
pub use anthropic::AnthropicClient;
#[cfg(feature = "openai")]
pub use openai::OpenAiClient;
