//! Admission control
//!
//! A limiter is consulted once per call, before any network traffic. Adapters
//! never retry; a limiter error fails the call as [`LlmError::RateLimitError`].

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::LlmError;

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Wait until the call may proceed, or refuse it.
    async fn acquire(&self) -> Result<(), LlmError>;
}

/// Spaces calls at least `interval` apart.
///
/// Slots are reserved in arrival order; callers sleep outside the lock.
#[derive(Debug)]
pub struct IntervalRateLimiter {
    interval: Duration,
    max_wait: Option<Duration>,
    next_slot: Mutex<Option<Instant>>,
}

impl IntervalRateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_wait: None,
            next_slot: Mutex::new(None),
        }
    }

    /// At most `n` calls per second.
    pub fn per_second(n: u32) -> Self {
        Self::new(Duration::from_secs(1) / n.max(1))
    }

    /// Refuse instead of waiting when the next slot is further away than `max_wait`.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }
}

#[async_trait]
impl RateLimiter for IntervalRateLimiter {
    async fn acquire(&self) -> Result<(), LlmError> {
        // reserve a slot under the lock, then wait without holding it
        let wait = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = next_slot.map_or(now, |s| s.max(now));
            let wait = slot - now;
            if let Some(max_wait) = self.max_wait
                && wait > max_wait
            {
                return Err(LlmError::RateLimitError(format!(
                    "next slot in {}ms exceeds max wait of {}ms",
                    wait.as_millis(),
                    max_wait.as_millis()
                )));
            }
            *next_slot = Some(slot + self.interval);
            wait
        };
        if !wait.is_zero() {
            tracing::debug!(target: "unillm::http", wait_ms = wait.as_millis() as u64, "rate limited");
            tokio::time::sleep(wait).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn spaces_consecutive_calls() {
        let limiter = IntervalRateLimiter::new(Duration::from_millis(20));
        let start = Instant::now();
        limiter.acquire().await.unwrap();
        limiter.acquire().await.unwrap();
        limiter.acquire().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn refuses_when_wait_exceeds_limit() {
        let limiter = IntervalRateLimiter::new(Duration::from_secs(60))
            .with_max_wait(Duration::from_millis(10));
        limiter.acquire().await.unwrap();
        let err = limiter.acquire().await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimitError(_)));
    }

    #[tokio::test]
    async fn concurrent_callers_never_wait_past_the_limit() {
        let limiter = Arc::new(
            IntervalRateLimiter::new(Duration::from_millis(200))
                .with_max_wait(Duration::from_millis(250)),
        );
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move {
                    let start = Instant::now();
                    let result = limiter.acquire().await;
                    (result, start.elapsed())
                })
            })
            .collect();

        let mut admitted = 0;
        let mut refused = 0;
        for handle in handles {
            let (result, waited) = handle.await.unwrap();
            match result {
                Ok(()) => {
                    admitted += 1;
                    assert!(waited < Duration::from_millis(300), "waited {waited:?}");
                }
                Err(LlmError::RateLimitError(_)) => {
                    refused += 1;
                    assert!(waited < Duration::from_millis(50), "refusal took {waited:?}");
                }
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!((admitted, refused), (2, 1));
    }
}
