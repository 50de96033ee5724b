//! Per-call timeout enforcement.
//!
//! # Responsibilities
//! - Bound every upstream call with a fixed deadline
//! - Report an elapsed deadline as `DispatchError::Timeout`, which the
//!   breaker counts as an instance failure
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; the in-flight request future is
//!   dropped when the deadline passes

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::endpoint::{DispatchError, Endpoint};
use crate::models::{Business, BusinessesRequest};

/// Endpoint decorator applying a fixed per-call timeout.
pub struct Timeout {
    instance: String,
    after: Duration,
    inner: Arc<dyn Endpoint>,
}

impl Timeout {
    pub fn new(instance: impl Into<String>, after: Duration, inner: Arc<dyn Endpoint>) -> Self {
        Self {
            instance: instance.into(),
            after,
            inner,
        }
    }
}

#[async_trait]
impl Endpoint for Timeout {
    async fn call(&self, request: BusinessesRequest) -> Result<Business, DispatchError> {
        match tokio::time::timeout(self.after, self.inner.call(request)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(instance = %self.instance, after = ?self.after, "Upstream call timed out");
                Err(DispatchError::Timeout {
                    instance: self.instance.clone(),
                    after: self.after,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{endpoint_fn, testing::business};

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let slow = endpoint_fn(|req: BusinessesRequest| async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, DispatchError>(business(&req.business_id, "late"))
        });
        let endpoint = Timeout::new("pos-a", Duration::from_millis(20), Arc::new(slow));

        let err = endpoint.call(BusinessesRequest::for_business("b1")).await.unwrap_err();
        assert!(matches!(err, DispatchError::Timeout { .. }));
        assert!(err.counts_against_instance());
    }

    #[tokio::test]
    async fn test_fast_call_passes_through() {
        let fast = endpoint_fn(|req: BusinessesRequest| async move { Ok::<_, DispatchError>(business(&req.business_id, "quick")) });
        let endpoint = Timeout::new("pos-a", Duration::from_millis(500), Arc::new(fast));

        let result = endpoint.call(BusinessesRequest::for_business("b1")).await.unwrap();
        assert_eq!(result.name, "quick");
    }
}
