//! Request identification.
//!
//! # Responsibilities
//! - Name the correlation header shared by the middleware and handlers
//! - Read the request ID assigned by `SetRequestIdLayer`
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A client-supplied `x-request-id` is kept, not replaced

use axum::http::HeaderMap;

/// Correlation header.
pub const X_REQUEST_ID: &str = "x-request-id";

/// The request ID carried by `headers`, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
