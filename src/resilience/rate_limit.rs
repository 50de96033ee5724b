//! Per-instance erroring rate limiter.
//!
//! A token bucket sits in front of each instance. When the bucket is
//! empty the call fails immediately with `RateLimited`; nothing queues,
//! so the retry loop can route the request to another instance.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use async_trait::async_trait;

use crate::endpoint::{DispatchError, Endpoint};
use crate::models::{Business, BusinessesRequest};
use crate::observability::metrics;

/// A simple token bucket.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_update: now,
        }
    }

    fn refill(&mut self, capacity: f64, refill_rate: f64, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        if now > self.last_update {
            self.last_update = now;
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64, now: Instant) -> bool {
        self.refill(capacity, refill_rate, now);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Token-bucket admission control for one instance.
#[derive(Debug)]
pub struct RateLimiter {
    bucket: Mutex<TokenBucket>,
    capacity: f64,
    refill_rate: f64,
}

impl RateLimiter {
    /// `qps` tokens are added per second, up to `burst`. The bucket starts full.
    pub fn new(qps: u32, burst: u32) -> Self {
        let capacity = f64::from(burst.max(1));
        Self {
            bucket: Mutex::new(TokenBucket::new(capacity, Instant::now())),
            capacity,
            refill_rate: f64::from(qps),
        }
    }

    /// Take one token if available.
    pub fn admit(&self) -> bool {
        self.admit_at(Instant::now())
    }

    fn admit_at(&self, now: Instant) -> bool {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        bucket.try_acquire(self.capacity, self.refill_rate, now)
    }

    /// Whole tokens currently available.
    pub fn available(&self) -> u32 {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        bucket.refill(self.capacity, self.refill_rate, Instant::now());
        bucket.tokens.floor() as u32
    }
}

/// Endpoint decorator that fails calls the limiter does not admit.
pub struct ErroringLimiter {
    instance: String,
    limiter: Arc<RateLimiter>,
    inner: Arc<dyn Endpoint>,
}

impl ErroringLimiter {
    pub fn new(instance: impl Into<String>, limiter: Arc<RateLimiter>, inner: Arc<dyn Endpoint>) -> Self {
        Self {
            instance: instance.into(),
            limiter,
            inner,
        }
    }
}

#[async_trait]
impl Endpoint for ErroringLimiter {
    async fn call(&self, request: BusinessesRequest) -> Result<Business, DispatchError> {
        if !self.limiter.admit() {
            tracing::debug!(instance = %self.instance, "Rate limit exceeded");
            metrics::record_rate_limited(&self.instance);
            return Err(DispatchError::RateLimited {
                instance: self.instance.clone(),
            });
        }
        self.inner.call(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::endpoint::testing::Scripted;

    #[test]
    fn test_burst_then_reject() {
        let limiter = RateLimiter::new(10, 3);
        let now = Instant::now();

        assert!(limiter.admit_at(now));
        assert!(limiter.admit_at(now));
        assert!(limiter.admit_at(now));
        assert!(!limiter.admit_at(now));
    }

    #[test]
    fn test_refills_at_sustained_rate() {
        let limiter = RateLimiter::new(10, 2);
        let start = Instant::now();
        assert!(limiter.admit_at(start));
        assert!(limiter.admit_at(start));
        assert!(!limiter.admit_at(start));

        // 10 qps → one token every 100ms
        assert!(!limiter.admit_at(start + Duration::from_millis(50)));
        assert!(limiter.admit_at(start + Duration::from_millis(150)));
        assert!(!limiter.admit_at(start + Duration::from_millis(160)));
    }

    #[test]
    fn test_refill_caps_at_burst() {
        let limiter = RateLimiter::new(100, 2);
        let later = Instant::now() + Duration::from_secs(60);

        assert!(limiter.admit_at(later));
        assert!(limiter.admit_at(later));
        assert!(!limiter.admit_at(later));
    }

    #[tokio::test]
    async fn test_rejected_call_never_reaches_inner() {
        let upstream = Scripted::healthy("pos-a");
        let limiter = Arc::new(RateLimiter::new(1, 1));
        let endpoint = ErroringLimiter::new("pos-a", limiter, upstream.clone());

        assert!(endpoint.call(BusinessesRequest::for_business("b1")).await.is_ok());
        let err = endpoint.call(BusinessesRequest::for_business("b1")).await.unwrap_err();

        assert!(matches!(err, DispatchError::RateLimited { ref instance } if instance == "pos-a"));
        assert_eq!(upstream.calls(), 1);
    }
}
