//! Reporting service library.
//!
//! Serves business records over `POST /reporting`, either from a local store
//! or by fanning out to upstream POS instances through a per-instance
//! circuit breaker and rate limiter, a round-robin balancer and a
//! budgeted retry dispatcher.

pub mod admin;
pub mod config;
pub mod endpoint;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod mock_pos;
pub mod models;
pub mod observability;
pub mod resilience;
pub mod security;
pub mod service;
pub mod store;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
