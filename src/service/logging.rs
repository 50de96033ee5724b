//! Logging decorator for the reporting service.

use std::time::Instant;

use async_trait::async_trait;

use crate::models::{Business, BusinessesRequest};
use crate::service::{ReportingService, ServiceError, SharedService};

/// Emits one structured event per reporting call.
pub struct LoggingService {
    next: SharedService,
}

impl LoggingService {
    pub fn new(next: SharedService) -> Self {
        Self { next }
    }
}

#[async_trait]
impl ReportingService for LoggingService {
    async fn reporting(&self, request: BusinessesRequest) -> Result<Business, ServiceError> {
        let begin = Instant::now();
        let (limit, offset) = (request.limit, request.offset);
        let business_id = request.business_id.clone();

        let result = self.next.reporting(request).await;
        let took = begin.elapsed();

        match &result {
            Ok(business) => tracing::info!(
                method = "reporting",
                limit,
                offset,
                business_id = %business_id,
                output = %business.name,
                took = ?took,
                "Reporting call served"
            ),
            Err(err) => tracing::warn!(
                method = "reporting",
                limit,
                offset,
                business_id = %business_id,
                err = %err,
                took = ?took,
                "Reporting call failed"
            ),
        }

        result
    }
}
