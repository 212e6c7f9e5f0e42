//! Exponential backoff for transient failures.
//!
//! Only errors that report themselves as retryable are retried; anything
//! else is returned on the first failure.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::errors::PipelineError;
use lore_indexer_repository::SearchError;
use lore_indexer_source::SourceError;

/// Errors that can tell transient failures apart from terminal ones.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for SearchError {
    fn is_retryable(&self) -> bool {
        SearchError::is_retryable(self)
    }
}

impl Retryable for SourceError {
    fn is_retryable(&self) -> bool {
        SourceError::is_retryable(self)
    }
}

impl Retryable for PipelineError {
    fn is_retryable(&self) -> bool {
        PipelineError::is_retryable(self)
    }
}

/// Retry settings shared by the reading and writing stages.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts after the first failure.
    pub max_retries: u32,
    /// Initial retry delay in milliseconds.
    pub initial_retry_delay_ms: u64,
    /// Maximum retry delay in milliseconds.
    pub max_retry_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_retry_delay_ms: 100,
            max_retry_delay_ms: 5000,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Run `operation`, retrying retryable errors with exponential backoff.
    ///
    /// # Arguments
    ///
    /// * `name` - Operation name used in log events
    /// * `operation` - Produces a fresh attempt each time it is called
    pub async fn run<T, E, F, Fut>(&self, name: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        let mut delay_ms = self.initial_retry_delay_ms;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        info!(operation = name, attempt = attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) => {
                    if !e.is_retryable() {
                        debug!(operation = name, error = %e, "Non-retryable error encountered");
                        return Err(e);
                    }
                    if attempt >= self.max_retries {
                        warn!(
                            operation = name,
                            attempts = attempt + 1,
                            error = %e,
                            "Giving up after retries"
                        );
                        return Err(e);
                    }

                    attempt += 1;
                    warn!(
                        operation = name,
                        attempt = attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Operation failed, retrying"
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    delay_ms = std::cmp::min(delay_ms * 2, self.max_retry_delay_ms);
                }
            }
        }
    }
}
