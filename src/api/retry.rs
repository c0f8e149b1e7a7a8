// src/api/retry.rs
//! Bounded retry with server-directed backoff.
//!
//! Rate-limit responses carry a `Retry-After` hint; the policy waits that
//! long plus a fixed safety margin. Retryable failures without a hint get
//! exponential backoff with jitter. Either way the attempt count is
//! capped — after the cap, the caller gets a terminal
//! `RetriesExhausted` instead of an unbounded retry loop.

use crate::constants::{
    MAX_RETRY_ATTEMPTS, RETRY_BASE_DELAY_MS, RETRY_MAX_DELAY_MS, RETRY_SAFETY_MARGIN_MS,
};
use crate::error::AppError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub safety_margin: Duration,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRY_ATTEMPTS,
            safety_margin: Duration::from_millis(RETRY_SAFETY_MARGIN_MS),
            base_delay: Duration::from_millis(RETRY_BASE_DELAY_MS),
            max_delay: Duration::from_millis(RETRY_MAX_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries; parity with the fetch paths that must
    /// fail fast (side-fetch probes).
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// The delay before retry number `attempt` (0-based), honoring the
    /// server hint when one exists.
    pub fn backoff_delay(&self, attempt: u32, server_hint: Option<Duration>) -> Duration {
        if let Some(hint) = server_hint {
            return hint + self.safety_margin;
        }
        let exp = self
            .base_delay
            .saturating_mul(1u32 << attempt.min(16))
            .min(self.max_delay);
        let jitter_ms = rand::rng().random_range(0..=exp.as_millis() as u64 / 4);
        (exp + Duration::from_millis(jitter_ms)).min(self.max_delay)
    }

    /// Runs `op`, retrying transient failures under this policy.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt + 1 < self.max_attempts => {
                    let delay = self.backoff_delay(attempt, err.retry_after());
                    log::warn!(
                        "Transient API failure (attempt {}/{}), retrying in {:?}: {}",
                        attempt + 1,
                        self.max_attempts,
                        delay,
                        err
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) if err.is_retryable() => {
                    return Err(AppError::RetriesExhausted {
                        attempts: self.max_attempts,
                        last_error: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }
}
