//! Service contract and capability flags

pub mod capabilities;
pub mod service;

pub use capabilities::Features;
pub use service::{AiService, AiServiceExt, ChatOutput};
