//! Retry policies and their execution with `backon`.
//!
//! A policy decides which status codes are retried and how long to back off.
//! Etag conflicts (`ABORTED`, `FAILED_PRECONDITION`) are never retried, even
//! when a caller lists them, since a retry would overwrite a concurrent change.

use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tokio::time::Instant;
use tonic::Code;
use tracing::warn;

use crate::error::{is_conflict_code, ClientError, Result};

/// Backoff and classification for retrying a unary call.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
    pub multiplier: f32,
    /// Maximum number of retries after the first attempt.
    pub max_retries: usize,
    /// Overall budget across attempts; no retry starts once it is spent.
    pub total_timeout: Option<Duration>,
    pub retryable_codes: Vec<Code>,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::idempotent()
    }
}

impl RetryPolicy {
    /// Never retry.
    pub fn none() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
            max_retries: 0,
            total_timeout: None,
            retryable_codes: Vec::new(),
            jitter: false,
        }
    }

    /// Retry `UNAVAILABLE` and `DEADLINE_EXCEEDED` starting at 100ms, x1.3,
    /// capped at 60s per delay and 60s overall.
    pub fn idempotent() -> Self {
        Self {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(60),
            multiplier: 1.3,
            max_retries: 10,
            total_timeout: Some(Duration::from_secs(60)),
            retryable_codes: vec![Code::Unavailable, Code::DeadlineExceeded],
            jitter: true,
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f32) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_total_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.total_timeout = timeout;
        self
    }

    pub fn with_retryable_codes(mut self, codes: impl IntoIterator<Item = Code>) -> Self {
        self.retryable_codes = codes.into_iter().collect();
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// Whether `err` qualifies for another attempt under this policy.
    pub fn is_retryable(&self, err: &ClientError) -> bool {
        match err {
            ClientError::Grpc(status) => {
                let code = status.code();
                !is_conflict_code(code) && self.retryable_codes.contains(&code)
            }
            _ => false,
        }
    }

    /// The `backon` builder for this policy's delays.
    pub fn backoff(&self) -> ExponentialBuilder {
        let builder = ExponentialBuilder::default()
            .with_min_delay(self.initial_delay)
            .with_max_delay(self.max_delay)
            .with_factor(self.multiplier)
            .with_max_times(self.max_retries);
        if self.jitter {
            builder.with_jitter()
        } else {
            builder
        }
    }
}

/// Run `call` until it succeeds, fails with a non-retryable error, or the
/// policy is exhausted.
pub async fn execute<T, F, Fut>(
    policy: &RetryPolicy,
    method: &'static str,
    mut call: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if policy.max_retries == 0 || policy.retryable_codes.is_empty() {
        return call().await;
    }

    let started = Instant::now();
    call.retry(policy.backoff())
        .when(|e: &ClientError| policy.is_retryable(e))
        .adjust(|_: &ClientError, delay: Option<Duration>| {
            // The next attempt must start inside the budget.
            delay.filter(|delay| {
                policy
                    .total_timeout
                    .map_or(true, |budget| started.elapsed() + *delay < budget)
            })
        })
        .notify(|err: &ClientError, dur: Duration| {
            warn!(method, error = %err, delay = ?dur, "Call failed, retrying");
        })
        .await
}
