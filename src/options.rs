//! Per-call options and per-method defaults.

use std::time::Duration;

use crate::retry::RetryPolicy;

/// Default per-attempt timeout for every RPC.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Options a caller sets on a single call. Unset values fall back to the
/// method's [`MethodDefaults`].
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub timeout: Option<Duration>,
    pub retry: Option<RetryPolicy>,
    pub metadata: Vec<(String, String)>,
}

impl CallOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    /// Fill unset fields from `defaults`.
    pub fn resolve(self, defaults: &MethodDefaults) -> CallSettings {
        CallSettings {
            timeout: self.timeout.unwrap_or(defaults.timeout),
            retry: self.retry.unwrap_or_else(|| defaults.retry.clone()),
            metadata: self.metadata,
        }
    }
}

/// Effective settings for one call.
#[derive(Debug, Clone)]
pub struct CallSettings {
    /// Per-attempt timeout.
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub metadata: Vec<(String, String)>,
}

/// Timeout and retry used when the caller sets neither.
#[derive(Debug, Clone)]
pub struct MethodDefaults {
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl MethodDefaults {
    /// Read-only and credentials RPCs: retried on `UNAVAILABLE` and `DEADLINE_EXCEEDED`.
    pub fn idempotent() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::idempotent(),
        }
    }

    /// Policy mutations: never retried.
    pub fn mutation() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::none(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
