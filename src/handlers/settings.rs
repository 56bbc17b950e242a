//! # Tenant Settings API Handlers

use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};

use crate::error::ApiError;
use crate::handlers::types::ApiResponse;
use crate::models::tenant_settings::SettingsValues;
use crate::repositories::TenantSettingsRepository;
use crate::server::AppState;
use crate::tenancy::{RequireTenant, TenantHeader};

/// Current league settings, or the defaults if none were saved
#[utoipa::path(
    get,
    path = "/api/tenants/settings",
    params(TenantHeader),
    responses(
        (status = 200, description = "League settings", body = ApiResponse<SettingsValues>),
        (status = 400, description = "No active tenant", body = ApiError)
    ),
    tag = "settings"
)]
pub async fn get_settings(
    State(state): State<AppState>,
    RequireTenant(_tenant): RequireTenant,
) -> Result<Json<ApiResponse<SettingsValues>>, ApiError> {
    let conn = state.scoped_conn();
    let settings = TenantSettingsRepository::new(&conn).get_settings().await?;
    Ok(Json(ApiResponse::new(settings)))
}

/// Save league settings
#[utoipa::path(
    put,
    path = "/api/tenants/settings",
    params(TenantHeader),
    request_body = SettingsValues,
    responses(
        (status = 200, description = "Settings saved", body = ApiResponse<SettingsValues>),
        (status = 400, description = "Validation failed or no active tenant", body = ApiError)
    ),
    tag = "settings"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    RequireTenant(_tenant): RequireTenant,
    payload: Result<Json<SettingsValues>, JsonRejection>,
) -> Result<Json<ApiResponse<SettingsValues>>, ApiError> {
    let Json(values) = payload?;
    let conn = state.scoped_conn();
    let settings = TenantSettingsRepository::new(&conn)
        .upsert_settings(values)
        .await?;
    Ok(Json(ApiResponse::new(settings)))
}
