//! Proxying facade.
//!
//! Translates a reporting call into a dispatch through the retrying,
//! load-balanced instance pool and maps the outcome back. Holds no state
//! of its own; everything mutable lives in the pool's per-instance
//! breakers and limiters or in the per-call retry budget.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ServiceConfig;
use crate::endpoint::http::upstream_client;
use crate::endpoint::Endpoint;
use crate::load_balancer::{Discovery, InstancePool};
use crate::models::{Business, BusinessesRequest};
use crate::resilience::Retry;
use crate::service::{validate, ReportingService, ServiceError, SharedService};

/// Reporting service backed by upstream POS instances.
pub struct ProxyingService {
    dispatcher: Arc<dyn Endpoint>,
}

impl ProxyingService {
    pub fn new(dispatcher: Arc<dyn Endpoint>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl ReportingService for ProxyingService {
    async fn reporting(&self, request: BusinessesRequest) -> Result<Business, ServiceError> {
        validate(&request)?;
        Ok(self.dispatcher.call(request).await?)
    }
}

/// Install the proxy layer in front of `next` when discovery yields instances.
///
/// With no instances `next` is returned untouched and no pool is built.
pub fn proxying(
    next: SharedService,
    discovery: &dyn Discovery,
    config: &ServiceConfig,
) -> (SharedService, Option<Arc<InstancePool>>) {
    let instances = discovery.instances();
    if instances.is_empty() {
        tracing::info!(proxy_to = "none", "Proxying disabled, serving from local store");
        return (next, None);
    }

    let addresses: Vec<String> = instances.iter().map(ToString::to_string).collect();
    tracing::info!(proxy_to = ?addresses, "Proxying to POS instances");

    let pool = Arc::new(InstancePool::connect(instances, &config.pool_settings(), upstream_client()));
    let retry = Retry::new(pool.clone(), config.proxy.retry_policy());
    let service: SharedService = Arc::new(ProxyingService::new(Arc::new(retry)));

    (service, Some(pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::endpoint::testing::Scripted;
    use crate::endpoint::DispatchError;
    use crate::load_balancer::{FixedDiscovery, Instance, PoolSettings};
    use crate::resilience::RetryPolicy;

    fn facade(upstreams: &[Arc<Scripted>], policy: RetryPolicy) -> ProxyingService {
        let endpoints = upstreams
            .iter()
            .enumerate()
            .map(|(i, upstream)| {
                let endpoint: Arc<dyn Endpoint> = upstream.clone();
                (Instance::parse(&format!("pos-{}:8091", i)).unwrap(), endpoint)
            })
            .collect();
        let pool = Arc::new(InstancePool::with_endpoints(endpoints, &PoolSettings::default()));
        ProxyingService::new(Arc::new(Retry::new(pool, policy)))
    }

    #[tokio::test]
    async fn test_empty_id_never_dispatches() {
        let upstream = Scripted::healthy("A");
        let svc = facade(&[upstream.clone()], RetryPolicy::default());

        let err = svc.reporting(BusinessesRequest::for_business("")).await.unwrap_err();
        assert!(matches!(err, ServiceError::EmptyBusinessId));
        assert_eq!(upstream.calls(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_budget_wraps_last_instance_error() {
        let a = Scripted::failing("A");
        let b = Scripted::failing("B");
        let svc = facade(
            &[a.clone(), b.clone()],
            RetryPolicy { max_attempts: 2, max_time: Duration::from_millis(250) },
        );

        let err = svc.reporting(BusinessesRequest::for_business("b1")).await.unwrap_err();
        match err {
            ServiceError::Dispatch(DispatchError::BudgetExhausted { attempts, last, .. }) => {
                assert_eq!(attempts, 2);
                assert_eq!(last.instance(), Some("B"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!((a.calls(), b.calls()), (1, 1));
    }

    #[tokio::test]
    async fn test_success_passes_business_through() {
        let svc = facade(&[Scripted::healthy("A")], RetryPolicy::default());
        let result = svc.reporting(BusinessesRequest::for_business("b9")).await.unwrap();
        assert_eq!(result.id, "b9");
        assert_eq!(result.name, "A");
    }

    #[test]
    fn test_empty_discovery_leaves_next_in_place() {
        let next: SharedService = Arc::new(ProxyingService::new(Scripted::healthy("local")));
        let (_, pool) = proxying(next, &FixedDiscovery::default(), &ServiceConfig::default());
        assert!(pool.is_none());
    }
}
