use std::{
    fmt::Display,
    future::Future,
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use log::*;
use thiserror::Error;
use tokio_retry::RetryIf;

/// A bounded retry schedule with linear backoff: after failed attempt `n` the caller sleeps `base_delay * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), base_delay }
    }

    /// The schedule used for store writes: 3 attempts, 1s base delay.
    pub fn for_persistence() -> Self {
        Self::new(3, Duration::from_secs(1))
    }

    /// The schedule used for confirmation mail: 3 attempts, 2s base delay.
    pub fn for_notifications() -> Self {
        Self::new(3, Duration::from_secs(2))
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// The pauses between consecutive attempts: one fewer than the number of attempts.
    pub fn schedule(&self) -> impl Iterator<Item = Duration> {
        let policy = *self;
        (1..policy.max_attempts).map(move |n| policy.delay_after(n))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::for_persistence()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryError<E> {
    /// The operation failed with an error that must not be retried.
    #[error("{0}")]
    Aborted(E),
    #[error("Gave up after {attempts} attempts. Last error: {last}")]
    Exhausted { attempts: u32, last: E },
}

impl<E> RetryError<E> {
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Aborted(e) => e,
            RetryError::Exhausted { last, .. } => last,
        }
    }
}

/// Runs `op` until it succeeds, fails with an error that `is_retryable` rejects, or the policy's attempts are used up.
///
/// `op` receives the 1-based attempt number.
pub async fn retry<T, E, F, Fut, P>(policy: RetryPolicy, label: &str, is_retryable: P, mut op: F) -> Result<T, RetryError<E>>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let attempts = AtomicU32::new(0);
    let action = || op(attempts.fetch_add(1, Ordering::SeqCst) + 1);
    let condition = |e: &E| {
        let retryable = is_retryable(e);
        let attempt = attempts.load(Ordering::SeqCst);
        if retryable && attempt < policy.max_attempts {
            let delay = policy.delay_after(attempt);
            warn!(
                "🔁️ {label} failed (attempt {attempt}/{}). Retrying in {}ms. {e}",
                policy.max_attempts,
                delay.as_millis()
            );
        }
        retryable
    };
    let result = RetryIf::spawn(policy.schedule(), action, condition).await;
    let attempt = attempts.load(Ordering::SeqCst);
    match result {
        Ok(v) => {
            if attempt > 1 {
                debug!("🔁️ {label} succeeded on attempt {attempt}");
            }
            Ok(v)
        },
        Err(e) if !is_retryable(&e) => Err(RetryError::Aborted(e)),
        Err(e) => {
            warn!("🔁️ {label} failed on the final attempt ({attempt}/{}). {e}", policy.max_attempts);
            Err(RetryError::Exhausted { attempts: attempt, last: e })
        },
    }
}
