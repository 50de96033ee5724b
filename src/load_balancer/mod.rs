//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Comma-separated instance list
//!     → discovery.rs (snapshot of parsed instances, taken once)
//!     → instance.rs (address → URL, default /businesses path)
//!     → pool.rs (decorate each instance: breaker → limiter → timeout → HTTP)
//!     → round_robin.rs (pick the next member for every call)
//! ```
//!
//! # Design Decisions
//! - Membership is fixed at construction; no live add/remove
//! - Selection ignores health; unhealthy members fail fast in their breaker
//! - The cursor is the only shared mutable state of the balancer

pub mod discovery;
pub mod instance;
pub mod pool;
pub mod round_robin;

pub use discovery::{split_instances, Discovery, FixedDiscovery};
pub use instance::{Instance, InstanceError};
pub use pool::{InstancePool, InstanceStatus, PoolSettings};
pub use round_robin::RoundRobin;

/// Load balancing strategy.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    /// Index of the member to use for the next call, or `None` when empty.
    fn next_index(&self, len: usize) -> Option<usize>;
}
