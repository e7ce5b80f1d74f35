//! Explicit stream cancellation
//!
//! Dropping a [`ChatStream`] already abandons the request. A [`CancelHandle`] is
//! for the case where the consumer and the party deciding to stop live in
//! different tasks.

use futures::StreamExt;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::streaming::ChatStream;

/// Requests cancellation of a wrapped stream.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. A wrapped stream ends at once, even while it is
    /// waiting on the network, and drops the inner stream, closing the connection.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once cancellation is requested.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}

/// Wrap a stream so it can be stopped through the returned handle.
pub fn make_cancellable_stream(stream: ChatStream) -> (ChatStream, CancelHandle) {
    let handle = CancelHandle::new();
    let token = handle.token.clone();
    let mut inner = stream;
    let wrapped = async_stream::stream! {
        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => None,
                item = inner.next() => item,
            };
            let Some(item) = next else { break };
            yield item;
        }
    };
    (Box::pin(wrapped), handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::types::{ChatResponse, ChatResponseResult};
    use std::time::Duration;

    #[tokio::test]
    async fn cancelled_stream_stops_yielding() {
        let items: Vec<Result<ChatResponse, LlmError>> = (0..5)
            .map(|i| {
                Ok(ChatResponse {
                    results: vec![ChatResponseResult::text(i.to_string())],
                    ..Default::default()
                })
            })
            .collect();
        let (mut stream, handle) =
            make_cancellable_stream(Box::pin(futures::stream::iter(items)));

        assert!(stream.next().await.is_some());
        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn cancel_interrupts_a_pending_read() {
        let pending: ChatStream =
            Box::pin(futures::stream::pending::<Result<ChatResponse, LlmError>>());
        let (mut stream, handle) = make_cancellable_stream(pending);

        let canceller = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let next = tokio::time::timeout(Duration::from_millis(500), stream.next())
            .await
            .expect("cancellation should end the stream");
        assert!(next.is_none());
        assert!(handle.is_cancelled());
    }
}
