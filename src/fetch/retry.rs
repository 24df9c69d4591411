//! Unified retry policy
//!
//! Both the page fetcher and the image materializer funnel their attempts
//! through [`with_retry`]. The policy distinguishes two failure classes:
//! - `NotFound` is terminal and never retried (it is the normal
//!   pagination-termination signal, not an error)
//! - `Retry` consumes attempts; exhausting them escalates to `Failed`

use std::future::Future;
use std::time::Duration;

use crate::config::CrawlerConfig;

/// Bounded-attempt retry policy with a fixed inter-attempt delay
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (>= 1)
    pub max_attempts: u32,

    /// Fixed sleep between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

impl From<&CrawlerConfig> for RetryPolicy {
    fn from(config: &CrawlerConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.retry_delay_ms),
        )
    }
}

/// Result of a single attempt inside [`with_retry`]
#[derive(Debug)]
pub enum Attempt<T> {
    /// The operation succeeded
    Done(T),

    /// 404-equivalent: terminal, never retried
    NotFound,

    /// Transient failure worth another attempt
    Retry(String),
}

/// Final outcome after the policy is exhausted
#[derive(Debug)]
pub enum Outcome<T> {
    Done(T),
    NotFound,
    /// All attempts consumed; carries the last failure reason
    Failed(String),
}

/// Runs `op` under the given policy
///
/// `op` is invoked up to `policy.max_attempts` times. `Attempt::Done` and
/// `Attempt::NotFound` return immediately; `Attempt::Retry` sleeps
/// `policy.delay` and tries again until attempts are exhausted.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Outcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Attempt<T>>,
{
    let mut last_reason = String::new();

    for attempt in 1..=policy.max_attempts {
        match op().await {
            Attempt::Done(value) => return Outcome::Done(value),
            Attempt::NotFound => return Outcome::NotFound,
            Attempt::Retry(reason) => {
                tracing::trace!("Attempt {}/{} failed: {}", attempt, policy.max_attempts, reason);
                last_reason = reason;
                if attempt < policy.max_attempts {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    Outcome::Failed(last_reason)
}
