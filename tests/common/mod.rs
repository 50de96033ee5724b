//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, StatusCode};
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;

use reporting_service::config::ServiceConfig;
use reporting_service::http::HttpServer;
use reporting_service::lifecycle::Shutdown;
use reporting_service::store::MemoryStore;

/// Id of a business present in `MemoryStore::seeded()`.
pub const SEEDED_ID: &str = "f21c2579-b95e-4a5b-aead-a3cf9d60d43b";
pub const SEEDED_NAME: &str = "Corner Cafe";

/// A mock POS instance listening on an ephemeral port.
pub struct Upstream {
    pub addr: SocketAddr,
    hits: Arc<AtomicU32>,
}

impl Upstream {
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Number of `/businesses` calls received so far.
    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }
}

/// JSON envelope carrying a business named `name`.
pub fn business_body(name: &str) -> String {
    serde_json::json!({
        "business": {
            "id": "b1",
            "name": name,
            "hours": [9, 17],
            "updated_at": "2024-03-01T10:00:00Z",
            "created_at": "2024-03-01T10:00:00Z"
        }
    })
    .to_string()
}

/// Start a programmable POS instance. `f` receives the zero-based call number.
pub async fn start_programmable_backend<F, Fut>(f: F) -> Upstream
where
    F: Fn(u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicU32::new(0));
    let f = Arc::new(f);

    let counter = hits.clone();
    let app = Router::new().route(
        "/businesses",
        post(move || {
            let f = f.clone();
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let (status, body) = f(n).await;
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
                (status, [(header::CONTENT_TYPE, "application/json")], body)
            }
        }),
    );

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Upstream { addr, hits }
}

/// POS instance answering every call with a business named `name`.
pub async fn start_healthy_backend(name: &'static str) -> Upstream {
    start_programmable_backend(move |_| async move { (200, business_body(name)) }).await
}

/// POS instance answering every call with 500.
pub async fn start_failing_backend() -> Upstream {
    start_programmable_backend(|_| async { (500, r#"{"err":"boom"}"#.to_string()) }).await
}

/// POS instance that answers only after `delay`.
pub async fn start_slow_backend(name: &'static str, delay: Duration) -> Upstream {
    start_programmable_backend(move |_| async move {
        tokio::time::sleep(delay).await;
        (200, business_body(name))
    })
    .await
}

/// Config proxying to `upstreams`.
pub fn proxy_config(upstreams: &[&Upstream]) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.proxy.instances = upstreams
        .iter()
        .map(|u| u.address())
        .collect::<Vec<_>>()
        .join(",");
    config
}

/// Start the reporting server on an ephemeral port over the seeded store.
pub async fn start_reporting_server(config: ServiceConfig) -> (String, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let server = HttpServer::new(config, Arc::new(MemoryStore::seeded())).unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (base_url, shutdown)
}
