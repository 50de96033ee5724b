//! Admin API: runtime status of the service and its instance pool.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/instances", get(get_instances))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::ServiceConfig;
    use crate::http::HttpServer;
    use crate::store::MemoryStore;

    fn admin(instances: &str) -> axum::Router {
        let mut config = ServiceConfig::default();
        config.admin.enabled = true;
        config.admin.api_key = "k3y".into();
        config.proxy.instances = instances.into();
        HttpServer::new(config, Arc::new(MemoryStore::new())).unwrap().admin_router()
    }

    fn get(path: &str, key: Option<&str>) -> Request<Body> {
        let mut builder = Request::get(path);
        if let Some(key) = key {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", key));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_requires_bearer_key() {
        let router = admin("");
        let response = router.clone().oneshot(get("/admin/status", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let response = router.oneshot(get("/admin/status", Some("wrong"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_status_and_instances() {
        let router = admin("pos-a:8091,pos-b:8091");

        let status = json(router.clone().oneshot(get("/admin/status", Some("k3y"))).await.unwrap()).await;
        assert_eq!(status["proxying"], true);
        assert_eq!(status["instances"], 2);

        let instances = json(router.oneshot(get("/admin/instances", Some("k3y"))).await.unwrap()).await;
        let instances = instances.as_array().unwrap();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0]["address"], "http://pos-a:8091/businesses");
        assert_eq!(instances[0]["state"], "closed");
    }
}
