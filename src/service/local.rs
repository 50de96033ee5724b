//! Local (non-proxied) reporting implementation.

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{Business, BusinessesRequest};
use crate::service::{validate, ReportingService, ServiceError};
use crate::store::BusinessRepository;

/// Serves businesses straight from the repository.
pub struct LocalReportingService {
    repository: Arc<dyn BusinessRepository>,
}

impl LocalReportingService {
    pub fn new(repository: Arc<dyn BusinessRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ReportingService for LocalReportingService {
    async fn reporting(&self, request: BusinessesRequest) -> Result<Business, ServiceError> {
        validate(&request)?;
        self.repository
            .get_by_id(&request.business_id)
            .ok_or(ServiceError::NotFound(request.business_id))
    }
}
