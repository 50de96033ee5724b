//! Mock POS instance.
//!
//! Serves the upstream contract the proxy dispatches to, backed by a
//! [`MemoryStore`]. Failures and latency can be injected to exercise the
//! breaker and retry paths against a real listener.
//!
//! # Routes
//! - `POST /businesses`: `BusinessesRequest` → `BusinessesResponse`
//! - `POST /menuItems`: `MenuItemsRequest` → `MenuItemsResponse` (item count)

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};

use crate::models::{BusinessesRequest, BusinessesResponse, MenuItemsRequest, MenuItemsResponse};
use crate::store::{BusinessRepository, MemoryStore};

/// Fault injection for the mock.
#[derive(Debug, Clone, Default)]
pub struct MockPosSettings {
    /// Probability in `[0, 1]` that a `/businesses` call answers 500.
    pub failure_rate: f64,
    /// Delay added before every `/businesses` answer.
    pub latency: Duration,
}

#[derive(Clone)]
struct MockState {
    store: Arc<MemoryStore>,
    settings: MockPosSettings,
}

pub fn router(store: Arc<MemoryStore>, settings: MockPosSettings) -> Router {
    Router::new()
        .route("/businesses", post(businesses))
        .route("/menuItems", post(menu_items))
        .with_state(MockState { store, settings })
}

async fn businesses(State(state): State<MockState>, Json(request): Json<BusinessesRequest>) -> impl IntoResponse {
    if !state.settings.latency.is_zero() {
        tokio::time::sleep(state.settings.latency).await;
    }

    if state.settings.failure_rate > 0.0 && fastrand::f64() < state.settings.failure_rate {
        tracing::debug!(business_id = %request.business_id, "Injected failure");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(BusinessesResponse::error("injected failure")),
        );
    }

    let result = if request.business_id.is_empty() {
        (StatusCode::BAD_REQUEST, Json(BusinessesResponse::error("empty business id")))
    } else {
        match state.store.get_by_id(&request.business_id) {
            Some(business) => (StatusCode::OK, Json(BusinessesResponse::ok(business))),
            None => (
                StatusCode::NOT_FOUND,
                Json(BusinessesResponse::error(format!("business {} not found", request.business_id))),
            ),
        }
    };

    tracing::info!(
        method = "businesses",
        business_id = %request.business_id,
        status = result.0.as_u16(),
        "Mock POS call"
    );
    result
}

async fn menu_items(State(state): State<MockState>, Json(request): Json<MenuItemsRequest>) -> Json<MenuItemsResponse> {
    let v = state.store.menu_items(&request.business_id).len();
    tracing::info!(method = "menuItems", business_id = %request.business_id, n = v, "Mock POS call");
    Json(MenuItemsResponse { v })
}
