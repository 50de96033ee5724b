//! HTTP Basic authentication for the reporting route.
//!
//! # Design Decisions
//! - Credentials come from configuration, checked on every request
//! - Missing, malformed and wrong credentials all yield the same 401

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::config::AuthConfig;
use crate::models::BusinessesResponse;

const CHALLENGE: &str = r#"Basic realm="reporting""#;

/// Expected Basic credentials.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    username: String,
    password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.username.clone(), config.password.clone())
    }

    /// Check the `Authorization` header against the expected credentials.
    pub fn authorize(&self, headers: &HeaderMap) -> bool {
        decode_credentials(headers).is_some_and(|(user, pass)| user == self.username && pass == self.password)
    }
}

/// Extract `user:pass` from a Basic `Authorization` header.
fn decode_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Encode credentials as an `Authorization` header value.
pub fn basic_header(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

pub async fn basic_auth_middleware(State(auth): State<Arc<BasicAuth>>, request: Request<Body>, next: Next) -> Response {
    if auth.authorize(request.headers()) {
        return next.run(request).await;
    }

    tracing::warn!(path = %request.uri().path(), "Rejected request with missing or invalid credentials");
    let mut response = (
        StatusCode::UNAUTHORIZED,
        Json(BusinessesResponse::error("unauthorized")),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE));
    response
}
