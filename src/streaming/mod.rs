//! Streaming chat responses
//!
//! A [`ChatStream`] is a finite, single-use sequence of partial
//! [`ChatResponse`](crate::types::ChatResponse) values in generation order.
//! Partial elements carry content deltas; the last element carries the finish
//! reason, function calls and usage. Dropping the stream abandons the request.

mod collect;
mod factory;

pub use collect::{StreamAccumulator, collect_stream};
pub use factory::{SseEventConverter, StreamFactory};

use std::pin::Pin;

use futures::Stream;

use crate::error::LlmError;
use crate::types::ChatResponse;

pub type ChatStream = Pin<Box<dyn Stream<Item = Result<ChatResponse, LlmError>> + Send>>;
