//! Bounded exponential backoff for transient upstream failures.
//!
//! Shared by the completion client and the job-posting client. Only errors the
//! caller classifies as transient (request timeouts) are retried; everything
//! else is returned on first occurrence.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first call.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff: u32,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    /// 5 attempts, sleeping 1s, 2s, 4s, 8s in between (capped at 120s).
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            backoff: 2,
            max_delay: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    pub fn next_delay(&self, current: Duration) -> Duration {
        (current * self.backoff).min(self.max_delay)
    }

    /// The sleeps taken between attempts if every attempt but the last fails.
    #[cfg(test)]
    pub fn delays(&self) -> Vec<Duration> {
        let mut delays = Vec::new();
        let mut delay = self.initial_delay;
        for _ in 1..self.max_attempts {
            delays.push(delay);
            delay = self.next_delay(delay);
        }
        delays
    }
}

/// Runs `op` until it succeeds, fails with a non-transient error, or the
/// attempt budget is spent. The last error is returned as-is.
pub async fn retry_transient<T, E, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    is_transient: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut delay = policy.initial_delay;
    let mut attempt = 1;
    loop {
        match op().await {
            Err(e) if attempt < policy.max_attempts && is_transient(&e) => {
                warn!(
                    "{label} attempt {attempt}/{} failed: {e}. Retrying in {}ms...",
                    policy.max_attempts,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                delay = policy.next_delay(delay);
                attempt += 1;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, PartialEq)]
    enum FakeError {
        Timeout,
        Fatal,
    }

    impl std::fmt::Display for FakeError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{self:?}")
        }
    }

    fn is_timeout(e: &FakeError) -> bool {
        *e == FakeError::Timeout
    }

    #[test]
    fn test_default_delay_schedule() {
        let delays = RetryPolicy::default().delays();
        let secs: Vec<u64> = delays.iter().map(|d| d.as_secs()).collect();
        assert_eq!(secs, vec![1, 2, 4, 8]);
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 10,
            ..RetryPolicy::default()
        };
        let delays = policy.delays();
        assert_eq!(delays.last().copied(), Some(Duration::from_secs(120)));
        assert!(delays.iter().all(|d| *d <= Duration::from_secs(120)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_are_retried_until_success() {
        let calls = AtomicU32::new(0);
        let result = retry_transient(&RetryPolicy::default(), "test", is_timeout, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(FakeError::Timeout)
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> =
            retry_transient(&RetryPolicy::default(), "test", is_timeout, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(FakeError::Timeout) }
            })
            .await;
        assert_eq!(result, Err(FakeError::Timeout));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> =
            retry_transient(&RetryPolicy::default(), "test", is_timeout, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(FakeError::Fatal) }
            })
            .await;
        assert_eq!(result, Err(FakeError::Fatal));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
