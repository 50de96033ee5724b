//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router for `/reporting` and `/health`
//! - Wire up middleware (request ID, tracing, timeout, body limit, auth)
//! - Hand decoded requests to the assembled reporting service
//! - Serve until the shutdown broadcast fires

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::request::request_id;
use crate::load_balancer::{InstanceError, InstancePool};
use crate::models::{BusinessesRequest, BusinessesResponse};
use crate::observability::metrics;
use crate::security::{basic_auth_middleware, BasicAuth};
use crate::service::{assemble, Assembled, SharedService};
use crate::store::BusinessRepository;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: SharedService,
    /// Present only when proxying to upstream instances.
    pub pool: Option<Arc<InstancePool>>,
    pub config: Arc<ServiceConfig>,
}

/// HTTP server for the reporting service.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Assemble the reporting service from `config` and build the router.
    pub fn new(config: ServiceConfig, repository: Arc<dyn BusinessRepository>) -> Result<Self, InstanceError> {
        let Assembled { service, pool } = assemble(&config, repository)?;
        Ok(Self::with_service(config, service, pool))
    }

    /// Build the router around an already assembled service.
    pub fn with_service(config: ServiceConfig, service: SharedService, pool: Option<Arc<InstancePool>>) -> Self {
        let state = AppState {
            service,
            pool,
            config: Arc::new(config),
        };
        let router = Self::build_router(&state);
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: &AppState) -> Router {
        let config = &state.config;

        let mut reporting = Router::new().route("/reporting", post(reporting_handler));
        if config.auth.enabled {
            let auth = Arc::new(BasicAuth::from_config(&config.auth));
            reporting = reporting.route_layer(middleware::from_fn_with_state(auth, basic_auth_middleware));
        }

        Router::new()
            .merge(reporting)
            .route("/health", get(health_handler))
            .with_state(state.clone())
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The public router, for serving on a custom listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The admin router sharing this server's state.
    pub fn admin_router(&self) -> Router {
        crate::admin::setup_admin_router(self.state.clone())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            proxying = self.state.pool.is_some(),
            auth = self.state.config.auth.enabled,
            "HTTP server starting"
        );

        serve(listener, self.router, shutdown).await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Serve the admin API until shutdown.
pub async fn run_admin(
    router: Router,
    listener: TcpListener,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API starting");
    serve(listener, router, shutdown).await?;
    tracing::info!("Admin API stopped");
    Ok(())
}

async fn serve(listener: TcpListener, router: Router, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await
}

/// `POST /reporting`.
async fn reporting_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<BusinessesRequest>, JsonRejection>,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers).to_string();

    let response = match payload {
        Ok(Json(request)) => match state.service.reporting(request).await {
            Ok(business) => (StatusCode::OK, Json(BusinessesResponse::ok(business))).into_response(),
            Err(err) => {
                tracing::debug!(request_id = %request_id, error = %err, "Reporting request failed");
                err.into_response()
            }
        },
        Err(rejection) => {
            tracing::warn!(request_id = %request_id, error = %rejection.body_text(), "Malformed reporting request");
            (rejection.status(), Json(BusinessesResponse::error(rejection.body_text()))).into_response()
        }
    };

    metrics::record_request(response.status().as_u16(), start);
    response
}

/// `GET /health`.
async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
