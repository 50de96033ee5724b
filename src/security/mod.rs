//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound /reporting request
//!     → auth.rs (Basic credentials, when enabled)
//!     → handler
//! ```
//!
//! Body size and inbound deadline are enforced by tower-http layers in
//! `http::server`; per-instance admission lives in `resilience::rate_limit`.

pub mod auth;

pub use auth::{basic_auth_middleware, basic_header, BasicAuth};
