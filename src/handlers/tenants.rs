//! # Tenants API Handlers
//!
//! League registry. These routes are tenant-agnostic and work without a
//! tenant header.

use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header::LOCATION},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::types::ApiResponse;
use crate::models::tenant::Model as TenantModel;
use crate::repositories::{CreateTenantRequest, TenantRepository};
use crate::server::AppState;

/// Request payload for registering a league
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTenantRequestDto {
    /// Display name (required, max 255 characters)
    #[schema(example = "Sunday Football League")]
    pub name: String,
    /// Sport played, defaults to `soccer`
    #[schema(example = "soccer")]
    pub sport_type: Option<String>,
    /// Subdomain the league is served under
    #[schema(example = "sunday-league")]
    pub subdomain: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TenantDto {
    pub id: Uuid,
    #[schema(example = "Sunday Football League")]
    pub name: String,
    #[schema(example = "soccer")]
    pub sport_type: String,
    #[schema(example = "sunday-league")]
    pub subdomain: String,
    /// RFC 3339 creation timestamp
    pub created_at: String,
}

impl From<TenantModel> for TenantDto {
    fn from(model: TenantModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            sport_type: model.sport_type,
            subdomain: model.subdomain,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

/// List all leagues
#[utoipa::path(
    get,
    path = "/api/leagues/tenants",
    responses(
        (status = 200, description = "All registered leagues", body = ApiResponse<Vec<TenantDto>>),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "tenants"
)]
pub async fn list_tenants(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TenantDto>>>, ApiError> {
    let conn = state.scoped_conn();
    let tenants = TenantRepository::new(&conn).list_tenants().await?;
    Ok(Json(ApiResponse::new(
        tenants.into_iter().map(TenantDto::from).collect(),
    )))
}

/// Register a new league
#[utoipa::path(
    post,
    path = "/api/leagues/tenants",
    request_body = CreateTenantRequestDto,
    responses(
        (status = 201, description = "League registered", body = ApiResponse<TenantDto>, headers(
            ("Location", description = "URL of the league's subdomain lookup")
        )),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 409, description = "Subdomain already taken", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "tenants"
)]
pub async fn create_tenant(
    State(state): State<AppState>,
    payload: Result<Json<CreateTenantRequestDto>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<ApiResponse<TenantDto>>), ApiError> {
    let Json(request) = payload?;
    let conn = state.scoped_conn();

    let tenant = TenantRepository::new(&conn)
        .create_tenant(CreateTenantRequest {
            name: request.name,
            sport_type: request.sport_type,
            subdomain: request.subdomain,
        })
        .await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!(
        "/api/leagues/tenants/by-subdomain/{}",
        tenant.subdomain
    )) {
        headers.insert(LOCATION, location);
    }

    Ok((
        StatusCode::CREATED,
        headers,
        Json(ApiResponse::new(TenantDto::from(tenant))),
    ))
}

/// Resolve a league from its subdomain
#[utoipa::path(
    get,
    path = "/api/leagues/tenants/by-subdomain/{subdomain}",
    params(
        ("subdomain" = String, Path, description = "League subdomain")
    ),
    responses(
        (status = 200, description = "League found", body = ApiResponse<TenantDto>),
        (status = 404, description = "No league uses this subdomain", body = ApiError)
    ),
    tag = "tenants"
)]
pub async fn get_tenant_by_subdomain(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> Result<Json<ApiResponse<TenantDto>>, ApiError> {
    let conn = state.scoped_conn();
    let tenant = TenantRepository::new(&conn)
        .find_by_subdomain(&subdomain)
        .await?
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND".to_string(),
                format!("No league uses subdomain '{subdomain}'"),
            )
        })?;

    Ok(Json(ApiResponse::new(TenantDto::from(tenant))))
}
