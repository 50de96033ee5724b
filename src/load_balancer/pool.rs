//! Instance pool management.
//!
//! # Responsibilities
//! - Decorate every discovered instance with its own breaker and limiter
//! - Apply the load balancing strategy to pick one member per call
//! - Expose per-instance status for the admin API

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::endpoint::http::UpstreamClient;
use crate::endpoint::{DispatchError, Endpoint, HttpEndpoint};
use crate::load_balancer::{Instance, LoadBalancer, RoundRobin};
use crate::models::{Business, BusinessesRequest};
use crate::resilience::{BreakerSettings, BreakerSnapshot, CircuitBreaker, ErroringLimiter, RateLimiter, Timeout};

/// Decoration settings applied to each instance.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Sustained calls per second admitted per instance.
    pub qps: u32,
    /// Token bucket capacity per instance.
    pub burst: u32,
    /// Deadline for a single upstream call.
    pub request_timeout: Duration,
    pub breaker: BreakerSettings,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            qps: 100,
            burst: 100,
            request_timeout: Duration::from_secs(1),
            breaker: BreakerSettings::default(),
        }
    }
}

/// One decorated instance.
struct PoolMember {
    instance: Instance,
    breaker: Arc<CircuitBreaker>,
    limiter: Arc<RateLimiter>,
}

/// Status of one member as reported by the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceStatus {
    pub address: String,
    #[serde(flatten)]
    pub breaker: BreakerSnapshot,
    pub tokens_available: u32,
}

/// Fixed, ordered set of decorated instances plus a selection strategy.
pub struct InstancePool {
    members: Vec<PoolMember>,
    balancer: Box<dyn LoadBalancer>,
}

impl InstancePool {
    /// Build the pool from an instance snapshot, calling each instance over HTTP.
    pub fn connect(instances: Vec<Instance>, settings: &PoolSettings, client: UpstreamClient) -> Self {
        let endpoints = instances
            .into_iter()
            .map(|instance| {
                let endpoint: Arc<dyn Endpoint> = Arc::new(HttpEndpoint::new(instance.clone(), client.clone()));
                (instance, endpoint)
            })
            .collect();
        Self::with_endpoints(endpoints, settings)
    }

    /// Build the pool around arbitrary base endpoints.
    ///
    /// Decoration order is fixed: breaker → limiter → timeout → endpoint.
    pub fn with_endpoints(endpoints: Vec<(Instance, Arc<dyn Endpoint>)>, settings: &PoolSettings) -> Self {
        let members = endpoints
            .into_iter()
            .map(|(instance, endpoint)| {
                let name = instance.to_string();
                let timed: Arc<dyn Endpoint> = Arc::new(Timeout::new(name.clone(), settings.request_timeout, endpoint));
                let limiter = Arc::new(RateLimiter::new(settings.qps, settings.burst));
                let limited: Arc<dyn Endpoint> = Arc::new(ErroringLimiter::new(name.clone(), limiter.clone(), timed));
                let breaker = Arc::new(CircuitBreaker::new(name, settings.breaker.clone(), limited));
                PoolMember {
                    instance,
                    breaker,
                    limiter,
                }
            })
            .collect::<Vec<_>>();

        tracing::info!(
            instances = members.len(),
            qps = settings.qps,
            burst = settings.burst,
            failure_threshold = settings.breaker.failure_threshold,
            "Instance pool built"
        );

        Self {
            members,
            balancer: Box::new(RoundRobin::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Instances in construction order.
    pub fn instances(&self) -> Vec<Instance> {
        self.members.iter().map(|m| m.instance.clone()).collect()
    }

    /// Breaker and limiter status of every member, in construction order.
    pub fn statuses(&self) -> Vec<InstanceStatus> {
        self.members
            .iter()
            .map(|m| InstanceStatus {
                address: m.instance.to_string(),
                breaker: m.breaker.snapshot(),
                tokens_available: m.limiter.available(),
            })
            .collect()
    }
}

#[async_trait]
impl Endpoint for InstancePool {
    async fn call(&self, request: BusinessesRequest) -> Result<Business, DispatchError> {
        let index = self
            .balancer
            .next_index(self.members.len())
            .ok_or(DispatchError::NoInstances)?;
        let member = &self.members[index];
        tracing::trace!(instance = %member.instance, "Instance selected");
        member.breaker.call(request).await
    }
}
