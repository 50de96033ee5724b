//! Endpoint abstraction.
//!
//! # Data Flow
//! ```text
//! ProxyingService
//!     → Retry            (resilience/retries.rs)
//!     → InstancePool     (load_balancer/pool.rs, round-robin pick)
//!     → CircuitBreaker   (resilience/circuit_breaker.rs)
//!     → ErroringLimiter  (resilience/rate_limit.rs)
//!     → Timeout          (resilience/timeouts.rs)
//!     → HttpEndpoint     (http.rs, POST to the instance)
//! ```
//!
//! # Design Decisions
//! - Every layer implements the same `Endpoint` trait and owns an
//!   `Arc<dyn Endpoint>` to the next one; layers are assembled once
//! - Failures are values (`DispatchError`), never panics

pub mod error;
pub mod http;

use std::future::Future;

use async_trait::async_trait;

use crate::models::{Business, BusinessesRequest};

pub use error::DispatchError;
pub use http::HttpEndpoint;

/// A single callable unit of work: fetch a business record.
#[async_trait]
pub trait Endpoint: Send + Sync {
    async fn call(&self, request: BusinessesRequest) -> Result<Business, DispatchError>;
}

/// Endpoint backed by an async closure.
pub struct FnEndpoint<F> {
    f: F,
}

/// Wrap an async closure as an [`Endpoint`].
pub fn endpoint_fn<F, Fut>(f: F) -> FnEndpoint<F>
where
    F: Fn(BusinessesRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Business, DispatchError>> + Send + 'static,
{
    FnEndpoint { f }
}

#[async_trait]
impl<F, Fut> Endpoint for FnEndpoint<F>
where
    F: Fn(BusinessesRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Business, DispatchError>> + Send + 'static,
{
    async fn call(&self, request: BusinessesRequest) -> Result<Business, DispatchError> {
        (self.f)(request).await
    }
}
