//! Dispatch failure taxonomy.

use std::time::Duration;

use thiserror::Error;

/// Errors produced while dispatching a request to upstream instances.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// Request rejected before any dispatch attempt.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Local token bucket for the instance is empty.
    #[error("rate limit exceeded for {instance}")]
    RateLimited { instance: String },

    /// Instance is known-bad; no network call was made.
    #[error("circuit breaker open for {instance}")]
    BreakerOpen { instance: String },

    /// Instance was called and failed or answered with garbage.
    #[error("upstream {instance} failed: {reason}")]
    Upstream { instance: String, reason: String },

    /// Instance did not answer within the per-call timeout.
    #[error("upstream {instance} timed out after {after:?}")]
    Timeout { instance: String, after: Duration },

    /// Attempt count or wall-clock budget ran out.
    #[error("gave up after {attempts} attempt(s) in {elapsed:?}: {last}")]
    BudgetExhausted {
        attempts: u32,
        elapsed: Duration,
        last: Box<DispatchError>,
    },

    /// The pool has no instances to select from.
    #[error("no upstream instances configured")]
    NoInstances,
}

impl DispatchError {
    /// Whether another instance may be tried after this failure.
    ///
    /// Upstream-reported validation problems arrive as `Upstream` and are
    /// retried like any other upstream failure.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DispatchError::RateLimited { .. }
                | DispatchError::BreakerOpen { .. }
                | DispatchError::Upstream { .. }
                | DispatchError::Timeout { .. }
        )
    }

    /// Whether the failure is evidence that the instance itself is unhealthy.
    pub fn counts_against_instance(&self) -> bool {
        matches!(self, DispatchError::Upstream { .. } | DispatchError::Timeout { .. })
    }

    /// The instance the failure originated from, if any.
    pub fn instance(&self) -> Option<&str> {
        match self {
            DispatchError::RateLimited { instance }
            | DispatchError::BreakerOpen { instance }
            | DispatchError::Upstream { instance, .. }
            | DispatchError::Timeout { instance, .. } => Some(instance),
            DispatchError::BudgetExhausted { last, .. } => last.instance(),
            DispatchError::Validation(_) | DispatchError::NoInstances => None,
        }
    }

    /// The concrete failure behind a `BudgetExhausted` wrapper.
    pub fn last_concrete(&self) -> &DispatchError {
        match self {
            DispatchError::BudgetExhausted { last, .. } => last.last_concrete(),
            other => other,
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Validation(_) => "validation",
            DispatchError::RateLimited { .. } => "rate_limited",
            DispatchError::BreakerOpen { .. } => "breaker_open",
            DispatchError::Upstream { .. } => "upstream",
            DispatchError::Timeout { .. } => "timeout",
            DispatchError::BudgetExhausted { .. } => "budget_exhausted",
            DispatchError::NoInstances => "no_instances",
        }
    }
}
