use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::llm::{CompletionError, TextCompletion};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: usize,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            max_backoff: Duration::from_millis(max_backoff_ms),
        }
    }

    /// Fail on the first error.
    pub fn none() -> Self {
        Self::new(0, 0, 0)
    }

    /// Run `call` until it succeeds or the retry budget is spent.
    ///
    /// The wait doubles after each failure, capped at `max_backoff`.
    pub async fn retry<F, Fut, T, E>(&self, service: &str, mut call: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut wait = self.initial_backoff;
        let mut retries = 0;

        loop {
            let error = match call().await {
                Ok(output) => {
                    if retries > 0 {
                        info!(service, retries, "Completion recovered");
                    }
                    return Ok(output);
                }
                Err(error) => error,
            };

            if retries == self.max_retries {
                if retries > 0 {
                    warn!(service, retries, %error, "Giving up on completion");
                }
                return Err(error);
            }

            retries += 1;
            warn!(
                service,
                retry = retries,
                of = self.max_retries,
                wait_ms = wait.as_millis() as u64,
                %error,
                "Completion failed, retrying"
            );
            sleep(wait).await;
            wait = (wait * 2).min(self.max_backoff);
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Applies a [`RetryPolicy`] to every call of the wrapped service.
pub struct RetryingCompletion<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C: TextCompletion> RetryingCompletion<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<C: TextCompletion> TextCompletion for RetryingCompletion<C> {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.policy
            .retry("llm", || self.inner.complete(prompt))
            .await
    }
}
