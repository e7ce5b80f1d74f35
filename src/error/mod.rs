//! Error Handling Module
//!
//! - Core error type (`LlmError`) and its coarse `ErrorCategory`
//! - Type conversions from common error types
//!
//! # Example
//!
//! ```rust,ignore
//! use unillm::error::{ErrorCategory, LlmError};
//!
//! let error = LlmError::InvalidInput("too many texts".into());
//! assert_eq!(error.category(), ErrorCategory::Validation);
//! assert!(!error.is_retryable());
//! ```

mod conversions;
pub mod types;

pub use types::*;
