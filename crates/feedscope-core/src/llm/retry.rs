//! Fixed-delay retry shared by the embedding client and the failover chain

use crate::error::{FeedscopeError, Result};
use std::future::Future;
use std::time::Duration;

/// How many times to try an operation and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (at least 1)
    pub max_attempts: usize,
    /// Pause between consecutive attempts
    pub delay: Duration,
}

/// Every attempt failed
#[derive(Debug)]
pub struct RetryExhausted {
    pub attempts: usize,
    pub last_error: FeedscopeError,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Single attempt, no retry
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Run `op` until it succeeds or the attempt budget is spent
    ///
    /// `op` receives the 1-based attempt number. Input errors are never
    /// retried.
    pub async fn run<T, F, Fut>(
        &self,
        label: &str,
        mut op: F,
    ) -> std::result::Result<T, RetryExhausted>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!("{} succeeded on attempt {}", label, attempt);
                    }
                    return Ok(value);
                }
                Err(e) if e.is_input_error() || attempt >= self.max_attempts => {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_error: e,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        "{} failed (attempt {}/{}): {}, retrying in {:?}",
                        label,
                        attempt,
                        self.max_attempts,
                        e,
                        self.delay
                    );
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(4, Duration::from_secs(1))
    }
}
