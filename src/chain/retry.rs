// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Bounded retry with exponential backoff for read-only chain calls.
//!
//! One policy object replaces the ad-hoc retry loops that otherwise grow
//! around every read endpoint. It must only ever wrap idempotent reads
//! (balance, decimals, metadata); the sign/broadcast step is structurally
//! outside it — re-signing with a stale nonce or re-broadcasting risks a
//! double spend, so any retry of a submission is an explicit new attempt by
//! the caller.

use std::future::Future;
use std::time::Duration;

/// Retry policy: capped attempt count, delay doubling per attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Must be at least 1.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each later attempt.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Backoff delay inserted after the given 1-based failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }

    /// Run a read-only operation, retrying failures for which `retryable`
    /// returns true, up to `max_attempts` total attempts.
    ///
    /// The last error is surfaced unchanged once attempts are exhausted.
    pub async fn run<T, E, F, Fut>(
        &self,
        mut op: F,
        retryable: impl Fn(&E) -> bool,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.max_attempts || !retryable(&err) {
                        return Err(err);
                    }
                    let delay = self.delay_after(attempt);
                    tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying read");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_without_retry() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let result: Result<u32, &str> = policy
            .run(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok(42) }
                },
                |_| true,
            )
            .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn persistent_failure_observes_exactly_max_attempts() {
        let policy = RetryPolicy::new(4, Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let result: Result<u32, &str> = policy
            .run(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("timeout") }
                },
                |_| true,
            )
            .await;

        assert_eq!(result, Err("timeout"));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn non_retryable_errors_fail_immediately() {
        let policy = RetryPolicy::new(5, Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let result: Result<u32, &str> = policy
            .run(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("rejected") }
                },
                |e| *e != "rejected",
            )
            .await;

        assert_eq!(result, Err("rejected"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let result: Result<u32, &str> = policy
            .run(
                || {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if n < 2 {
                            Err("timeout")
                        } else {
                            Ok(7)
                        }
                    }
                },
                |_| true,
            )
            .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn backoff_delays_are_non_decreasing() {
        let policy = RetryPolicy::new(6, Duration::from_millis(100));
        let delays: Vec<Duration> = (1..6).map(|n| policy.delay_after(n)).collect();

        assert_eq!(delays[0], Duration::from_millis(100));
        assert_eq!(delays[1], Duration::from_millis(200));
        assert_eq!(delays[2], Duration::from_millis(400));
        for pair in delays.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn zero_attempts_is_clamped_to_one() {
        let policy = RetryPolicy::new(0, Duration::from_millis(1));
        assert_eq!(policy.max_attempts, 1);
    }
}
