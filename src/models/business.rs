//! Business records and the request/response pair of the reporting call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page size used when the caller omits `limit`.
pub const DEFAULT_LIMIT: u32 = 500;

/// Request to fetch a business record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessesRequest {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub business_id: String,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl BusinessesRequest {
    /// Request for a single business with default paging.
    pub fn for_business(business_id: impl Into<String>) -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            business_id: business_id.into(),
        }
    }
}

/// A business as reported by a POS provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    pub id: String,
    pub name: String,
    /// Opening hours, one entry per hour boundary as the provider reports them.
    #[serde(default)]
    pub hours: Vec<i32>,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Envelope returned by `/reporting` and by upstream `/businesses` instances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessesResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business: Option<Business>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

impl BusinessesResponse {
    pub fn ok(business: Business) -> Self {
        Self {
            business: Some(business),
            err: None,
        }
    }

    pub fn error(err: impl Into<String>) -> Self {
        Self {
            business: None,
            err: Some(err.into()),
        }
    }
}
