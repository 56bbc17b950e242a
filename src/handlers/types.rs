//! # Common API Types
//!
//! Response envelope shared by the league endpoints.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::telemetry;

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response metadata
    pub meta: ResponseMeta,
}

/// Response metadata
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResponseMeta {
    /// Trace identifier of the request
    #[schema(example = "3f1c9a4e-7d2b-4c1a-9f0e-2b8d6c5a4e31")]
    pub trace_id: Option<String>,
    /// Response timestamp (RFC 3339)
    #[schema(example = "2025-03-01T10:00:00+00:00")]
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta {
                trace_id: telemetry::current_trace_id(),
                timestamp: Utc::now().to_rfc3339(),
            },
        }
    }
}

/// Request body carrying a single target team
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TeamTarget {
    pub team_id: uuid::Uuid,
}
