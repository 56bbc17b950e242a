//! Tenant boundary for inbound HTTP requests.
//!
//! Resolves the tenant header, runs the rest of the stack inside a fresh
//! [`TenantContext`] scope and clears the context on every exit path. A
//! missing or malformed header never fails the request by itself; routes that
//! need a tenant ask for one with [`RequireTenant`], and the enforcer rejects
//! unscoped data access.

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use super::context::{TenantContext, TenantId};
use crate::config::{AppConfig, DEFAULT_TENANT_HEADER};
use crate::error::{ApiError, tenant_required};

const MAX_LOGGED_HEADER_CHARS: usize = 64;

/// Result of reading the tenant header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderResolution {
    Present(TenantId),
    Missing,
    /// Carries a truncated copy of the raw value for logging.
    Malformed(String),
}

impl HeaderResolution {
    pub fn tenant(&self) -> Option<TenantId> {
        match self {
            HeaderResolution::Present(id) => Some(*id),
            _ => None,
        }
    }
}

pub fn resolve_tenant_header(headers: &HeaderMap, header_name: &str) -> HeaderResolution {
    let Some(raw) = headers.get(header_name) else {
        return HeaderResolution::Missing;
    };
    let Ok(value) = raw.to_str() else {
        return HeaderResolution::Malformed("<non-visible-ascii>".to_string());
    };

    let value = value.trim();
    if value.is_empty() {
        return HeaderResolution::Missing;
    }

    match value.parse::<TenantId>() {
        Ok(id) => HeaderResolution::Present(id),
        Err(_) => HeaderResolution::Malformed(value.chars().take(MAX_LOGGED_HEADER_CHARS).collect()),
    }
}

/// Runs `future` with `tenant` as the active tenant and clears it afterwards,
/// including when `future` panics or is dropped before completion.
pub async fn with_tenant_boundary<F>(tenant: Option<TenantId>, future: F) -> F::Output
where
    F: Future,
{
    TenantContext::scope(async move {
        // Cannot fail: the scope was opened just above.
        let _guard = TenantContext::enter(tenant).ok();
        future.await
    })
    .await
}

/// Name of the header the tenant boundary read, as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantHeaderName(pub String);

/// Axum middleware wrapping every request in a tenant boundary.
pub async fn tenant_boundary(
    State(config): State<Arc<AppConfig>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = config.tenant_header.as_str();
    let tenant = match resolve_tenant_header(request.headers(), header) {
        HeaderResolution::Present(id) => {
            tracing::debug!(tenant_id = %id, "Resolved request tenant");
            Some(id)
        }
        HeaderResolution::Missing => None,
        HeaderResolution::Malformed(value) => {
            counter!("tenant_header_malformed_total").increment(1);
            tracing::warn!(
                header,
                value = %value,
                path = %request.uri().path(),
                "Ignoring malformed tenant header; request continues without a tenant"
            );
            None
        }
    };
    request
        .extensions_mut()
        .insert(TenantHeaderName(config.tenant_header.clone()));

    with_tenant_boundary(tenant, next.run(request)).await
}

/// Extractor for handlers that cannot run without a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequireTenant(pub TenantId);

impl<S> FromRequestParts<S> for RequireTenant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .extensions
            .get::<TenantHeaderName>()
            .map_or(DEFAULT_TENANT_HEADER, |name| name.0.as_str());
        TenantContext::get()
            .map(RequireTenant)
            .ok_or_else(|| tenant_required(header))
    }
}

/// OpenAPI header parameter for the tenant header.
///
/// Documented under the default name;
/// [`ApiDoc::for_config`](crate::server::ApiDoc::for_config) renames it when
/// a different header is configured.
#[derive(Debug, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Header)]
pub struct TenantHeader {
    /// Tenant identifier (UUID) that scopes the request to one league
    #[serde(rename = "X-Tenant-ID")]
    #[param(rename = "X-Tenant-ID", value_type = String)]
    pub tenant_id: String,
}
