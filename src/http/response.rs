//! Response mapping.
//!
//! # Responsibilities
//! - Map service errors to HTTP status codes
//! - Wrap every body in the `BusinessesResponse` envelope
//!
//! # Design Decisions
//! - Local validation failures are client errors (400)
//! - Upstream timeouts surface as 504 Gateway Timeout, other dispatch
//!   failures as 502 Bad Gateway

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::endpoint::DispatchError;
use crate::models::BusinessesResponse;
use crate::service::ServiceError;

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::EmptyBusinessId => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Dispatch(err) => match err.last_concrete() {
                DispatchError::Validation(_) => StatusCode::BAD_REQUEST,
                DispatchError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                DispatchError::NoInstances => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(BusinessesResponse::error(self.to_string()))).into_response()
    }
}
