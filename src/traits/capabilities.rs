//! Capability flags

use serde::{Deserialize, Serialize};

/// Features a caller must check before using function calling or streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Features {
    pub functions: bool,
    pub streaming: bool,
}

impl Features {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_functions(mut self) -> Self {
        self.functions = true;
        self
    }

    pub fn with_streaming(mut self) -> Self {
        self.streaming = true;
        self
    }

    pub fn supports(&self, feature: &str) -> bool {
        match feature {
            "functions" | "tools" => self.functions,
            "streaming" => self.streaming,
            _ => false,
        }
    }
}
