//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (budgets > 0, addresses parse)
//! - Check that every instance address is usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{ServiceConfig, PLACEHOLDER_API_KEY};
use crate::load_balancer::{split_instances, Instance};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("proxy.instances: {0}")]
    InvalidInstance(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("auth.password must be set when auth is enabled")]
    MissingPassword,

    #[error("admin.api_key must be changed when the admin API is enabled")]
    PlaceholderApiKey,

    #[error("observability.log_format must be 'pretty' or 'json', got '{0}'")]
    UnknownLogFormat(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);

    for raw in split_instances(&config.proxy.instances) {
        if let Err(e) = Instance::parse(raw) {
            errors.push(ValidationError::InvalidInstance(e.to_string()));
        }
    }

    let positive = [
        ("proxy.qps", config.proxy.qps as u64),
        ("proxy.burst", config.proxy.burst as u64),
        ("proxy.max_attempts", config.proxy.max_attempts as u64),
        ("proxy.max_time_ms", config.proxy.max_time_ms),
        ("proxy.request_timeout_ms", config.proxy.request_timeout_ms),
        ("breaker.failure_threshold", config.breaker.failure_threshold as u64),
        ("breaker.half_open_probes", config.breaker.half_open_probes as u64),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("security.max_body_size", config.security.max_body_size as u64),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    if config.auth.enabled && config.auth.password.is_empty() {
        errors.push(ValidationError::MissingPassword);
    }

    if config.admin.enabled {
        check_addr(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.admin.api_key.is_empty() || config.admin.api_key == PLACEHOLDER_API_KEY {
            errors.push(ValidationError::PlaceholderApiKey);
        }
    }

    if config.observability.metrics_enabled {
        check_addr(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::UnknownLogFormat(other.to_string())),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
