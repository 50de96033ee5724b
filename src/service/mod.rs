//! Reporting service subsystem.
//!
//! # Data Flow
//! ```text
//! /reporting handler
//!     → logging.rs (one structured line per call, with timing)
//!     → proxy.rs (validate, dispatch through Retry → InstancePool)
//!       or, with no instances configured,
//!       local.rs (validate, read from the BusinessRepository)
//! ```
//!
//! # Design Decisions
//! - Services are decorators over one trait, assembled once at startup
//! - An empty instance list is a configuration state: the proxy layer is
//!   simply not installed
//! - Only the terminal failure of a call crosses this boundary

pub mod local;
pub mod logging;
pub mod proxy;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ServiceConfig;
use crate::endpoint::DispatchError;
use crate::load_balancer::{FixedDiscovery, InstanceError, InstancePool};
use crate::models::{Business, BusinessesRequest};
use crate::store::BusinessRepository;

pub use local::LocalReportingService;
pub use logging::LoggingService;
pub use proxy::{proxying, ProxyingService};

/// The reporting contract served at `/reporting`.
#[async_trait]
pub trait ReportingService: Send + Sync {
    async fn reporting(&self, request: BusinessesRequest) -> Result<Business, ServiceError>;
}

pub type SharedService = Arc<dyn ReportingService>;

/// Errors surfaced to the HTTP layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Rejected before any dispatch attempt.
    #[error("empty business id")]
    EmptyBusinessId,

    #[error("business {0} not found")]
    NotFound(String),

    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Reject requests without a business id.
pub(crate) fn validate(request: &BusinessesRequest) -> Result<(), ServiceError> {
    if request.business_id.trim().is_empty() {
        return Err(ServiceError::EmptyBusinessId);
    }
    Ok(())
}

/// The composed service and, when proxying, the pool behind it.
pub struct Assembled {
    pub service: SharedService,
    pub pool: Option<Arc<InstancePool>>,
}

/// Compose local → proxying (when instances are configured) → logging.
pub fn assemble(config: &ServiceConfig, repository: Arc<dyn BusinessRepository>) -> Result<Assembled, InstanceError> {
    let local: SharedService = Arc::new(LocalReportingService::new(repository));
    let discovery = FixedDiscovery::parse(&config.proxy.instances)?;
    let (service, pool) = proxying(local, &discovery, config);

    Ok(Assembled {
        service: Arc::new(LoggingService::new(service)),
        pool,
    })
}
