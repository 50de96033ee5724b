//! Retrying dispatcher.
//!
//! # Responsibilities
//! - Call the balancer until one attempt succeeds
//! - Stop at `max_attempts` or once `max_time` has elapsed, whichever
//!   comes first, and report the last concrete failure
//!
//! # Design Decisions
//! - No backoff or jitter: each attempt goes to the next instance in the
//!   rotation, so spacing attempts in time buys nothing
//! - The first attempt is always made; the wall-clock check only gates
//!   further attempts
//! - An attempt already in flight is never aborted by the budget; per-call
//!   deadlines belong to `timeouts.rs`
//! - Local validation failures are returned immediately

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::endpoint::{DispatchError, Endpoint};
use crate::models::{Business, BusinessesRequest};
use crate::observability::metrics;

/// Attempt and wall-clock bounds for one inbound request.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub max_time: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            max_time: Duration::from_millis(250),
        }
    }
}

/// Remaining budget of a single call. Created per request, only ever shrinks.
#[derive(Debug)]
struct RetryBudget {
    attempts_left: u32,
    deadline: Instant,
}

impl RetryBudget {
    fn start(policy: &RetryPolicy, now: Instant) -> Self {
        Self {
            attempts_left: policy.max_attempts.max(1),
            deadline: now + policy.max_time,
        }
    }

    fn take_attempt(&mut self) {
        self.attempts_left = self.attempts_left.saturating_sub(1);
    }

    fn allows_another(&self, now: Instant) -> bool {
        self.attempts_left > 0 && now < self.deadline
    }
}

/// Endpoint that retries across the balancer's instances.
pub struct Retry {
    policy: RetryPolicy,
    balancer: Arc<dyn Endpoint>,
}

impl Retry {
    pub fn new(balancer: Arc<dyn Endpoint>, policy: RetryPolicy) -> Self {
        Self { policy, balancer }
    }
}

#[async_trait]
impl Endpoint for Retry {
    async fn call(&self, request: BusinessesRequest) -> Result<Business, DispatchError> {
        let started = Instant::now();
        let mut budget = RetryBudget::start(&self.policy, started);
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            budget.take_attempt();

            let err = match self.balancer.call(request.clone()).await {
                Ok(business) => {
                    if attempts > 1 {
                        tracing::debug!(attempts, business_id = %request.business_id, "Dispatch succeeded after retry");
                    }
                    metrics::record_dispatch_attempt("success");
                    return Ok(business);
                }
                Err(err) => err,
            };

            metrics::record_dispatch_attempt(err.kind());

            if !err.is_retryable() {
                return Err(err);
            }

            if !budget.allows_another(Instant::now()) {
                let elapsed = started.elapsed();
                tracing::warn!(
                    attempts,
                    elapsed = ?elapsed,
                    error = %err,
                    "Retry budget exhausted"
                );
                return Err(DispatchError::BudgetExhausted {
                    attempts,
                    elapsed,
                    last: Box::new(err),
                });
            }

            tracing::debug!(attempt = attempts, error = %err, "Attempt failed, retrying on next instance");
        }
    }
}
