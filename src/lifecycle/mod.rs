//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → wait_for_signal returns
//!
//! Shutdown (shutdown.rs):
//!     trigger → public and admin listeners stop accepting → drain → exit
//! ```
//!
//! # Design Decisions
//! - One broadcast fans the shutdown out to every listener task
//! - In-flight requests finish under axum's graceful shutdown

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
