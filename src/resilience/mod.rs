//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to the instance pool:
//!     → retries.rs (pick again on failure, bounded by attempts and wall clock)
//!     → [pool selects an instance]
//!     → circuit_breaker.rs (fail fast while the instance is known-bad)
//!     → rate_limit.rs (fail fast when the instance's bucket is empty)
//!     → timeouts.rs (bound the upstream call)
//! ```
//!
//! # Design Decisions
//! - Nothing here blocks or queues; overload and known-bad instances
//!   surface as errors so the retry loop can route elsewhere
//! - Breaker and limiter state is per instance, each behind its own lock
//! - All layers are `Endpoint` decorators assembled once at startup

pub mod circuit_breaker;
pub mod rate_limit;
pub mod retries;
pub mod timeouts;

pub use circuit_breaker::{BreakerSettings, BreakerSnapshot, BreakerState, CircuitBreaker};
pub use rate_limit::{ErroringLimiter, RateLimiter};
pub use retries::{Retry, RetryPolicy};
pub use timeouts::Timeout;
