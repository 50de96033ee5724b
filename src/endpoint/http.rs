//! HTTP endpoint for a single upstream POS instance.
//!
//! # Responsibilities
//! - Encode the request as JSON and POST it to the instance URL
//! - Decode the `BusinessesResponse` envelope
//! - Turn transport errors, non-2xx statuses and `err` envelopes into
//!   `DispatchError::Upstream`

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::endpoint::{DispatchError, Endpoint};
use crate::load_balancer::Instance;
use crate::models::{Business, BusinessesRequest, BusinessesResponse};

/// Largest upstream response body accepted.
const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

const USER_AGENT: &str = concat!("reporting-service/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client type for upstream calls.
pub type UpstreamClient = Client<HttpConnector, Body>;

/// Build the client shared by all instance endpoints.
pub fn upstream_client() -> UpstreamClient {
    Client::builder(TokioExecutor::new()).build(HttpConnector::new())
}

/// POSTs requests to one upstream instance.
#[derive(Clone)]
pub struct HttpEndpoint {
    instance: Instance,
    client: UpstreamClient,
}

impl HttpEndpoint {
    pub fn new(instance: Instance, client: UpstreamClient) -> Self {
        Self { instance, client }
    }

    fn failure(&self, reason: impl Into<String>) -> DispatchError {
        DispatchError::Upstream {
            instance: self.instance.to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Endpoint for HttpEndpoint {
    async fn call(&self, request: BusinessesRequest) -> Result<Business, DispatchError> {
        let body = serde_json::to_vec(&request)
            .map_err(|e| self.failure(format!("encode request: {}", e)))?;

        let upstream_request = Request::builder()
            .method(Method::POST)
            .uri(self.instance.url().as_str())
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, USER_AGENT)
            .body(Body::from(body))
            .map_err(|e| self.failure(format!("build request: {}", e)))?;

        let response = self
            .client
            .request(upstream_request)
            .await
            .map_err(|e| self.failure(format!("request failed: {}", e)))?;

        let status = response.status();
        let bytes = axum::body::to_bytes(Body::new(response.into_body()), MAX_RESPONSE_BYTES)
            .await
            .map_err(|e| self.failure(format!("read body: {}", e)))?;

        if !status.is_success() {
            return Err(self.failure(format!("status {}", status)));
        }

        let envelope: BusinessesResponse = serde_json::from_slice(&bytes)
            .map_err(|e| self.failure(format!("malformed response: {}", e)))?;

        if let Some(err) = envelope.err.filter(|e| !e.is_empty()) {
            return Err(self.failure(err));
        }

        envelope
            .business
            .ok_or_else(|| self.failure("response has no business"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use tokio::net::TcpListener;

    use crate::endpoint::testing::business;

    async fn serve(router: Router) -> Instance {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Instance::parse(&addr.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_decodes_business_envelope() {
        let router = Router::new().route(
            "/businesses",
            post(|Json(req): Json<BusinessesRequest>| async move {
                Json(BusinessesResponse::ok(business(&req.business_id, "Harbour Grill")))
            }),
        );
        let endpoint = HttpEndpoint::new(serve(router).await, upstream_client());

        let result = endpoint.call(BusinessesRequest::for_business("b42")).await.unwrap();
        assert_eq!(result.id, "b42");
        assert_eq!(result.name, "Harbour Grill");
    }

    #[tokio::test]
    async fn test_upstream_error_envelope_is_failure() {
        let router = Router::new().route(
            "/businesses",
            post(|| async { Json(BusinessesResponse::error("empty string")) }),
        );
        let endpoint = HttpEndpoint::new(serve(router).await, upstream_client());

        let err = endpoint.call(BusinessesRequest::for_business("")).await.unwrap_err();
        match err {
            DispatchError::Upstream { reason, .. } => assert_eq!(reason, "empty string"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_status_is_failure() {
        let router = Router::new().route(
            "/businesses",
            post(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let endpoint = HttpEndpoint::new(serve(router).await, upstream_client());

        let err = endpoint.call(BusinessesRequest::for_business("b1")).await.unwrap_err();
        assert!(err.to_string().contains("503"));
        assert!(err.counts_against_instance());
    }

    #[tokio::test]
    async fn test_connection_refused_is_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoint = HttpEndpoint::new(Instance::parse(&addr.to_string()).unwrap(), upstream_client());
        let err = endpoint.call(BusinessesRequest::for_business("b1")).await.unwrap_err();
        assert!(matches!(err, DispatchError::Upstream { .. }));
    }
}
