use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::load_balancer::InstanceStatus;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub proxying: bool,
    pub instances: usize,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        proxying: state.pool.is_some(),
        instances: state.pool.as_ref().map_or(0, |pool| pool.len()),
    })
}

/// Breaker and limiter status per instance; empty when not proxying.
pub async fn get_instances(State(state): State<AppState>) -> Json<Vec<InstanceStatus>> {
    Json(state.pool.as_ref().map(|pool| pool.statuses()).unwrap_or_default())
}
