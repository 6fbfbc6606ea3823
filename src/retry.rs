use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Classification hook for the retry loop.
pub trait Retryable {
    fn is_transient(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    NoRetry,
    RetryAfter(Duration),
}

/// Per-item retry policy. The default is unbounded with a short fixed delay,
/// which keeps the "never drop an item" behavior while making the
/// unboundedness explicit configuration instead of implicit control flow.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first); `None` = unbounded.
    pub max_attempts: Option<u32>,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn bounded(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            ..Self::default()
        }
    }

    /// `attempt` is 1-based (1 = the attempt that just failed).
    pub fn decide(&self, attempt: u32, transient: bool) -> RetryDecision {
        if !transient {
            return RetryDecision::NoRetry;
        }
        if let Some(max) = self.max_attempts {
            if attempt >= max {
                return RetryDecision::NoRetry;
            }
        }
        RetryDecision::RetryAfter(self.delay)
    }
}

/// Runs `op` until it succeeds or the policy says stop. Each failure is
/// reported with the item's label before the next attempt; permanent errors
/// surface immediately so the caller can report them instead of looping on a
/// failure that will never clear.
pub async fn run_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => match policy.decide(attempt, e.is_transient()) {
                RetryDecision::NoRetry => return Err(e),
                RetryDecision::RetryAfter(delay) => {
                    eprintln!("{}: {} (attempt {})", label, e, attempt);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            },
        }
    }
}
