//! # Seasons API Handlers

use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::types::ApiResponse;
use crate::models::season::Model as SeasonModel;
use crate::repositories::{
    CreateSeasonRequest, PlayerRepository, SeasonRepository, TenantSettingsRepository,
};
use crate::server::AppState;
use crate::tenancy::{RequireTenant, TenantHeader};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSeasonRequestDto {
    #[schema(example = "Spring 2025")]
    pub name: String,
    #[schema(value_type = String, format = Date, example = "2025-03-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2025-06-30")]
    pub end_date: NaiveDate,
    /// Roster limit, defaults to 26
    pub max_active_players_per_team: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SeasonDto {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,
    /// `draft`, `active` or `completed`
    pub status: String,
    pub current_matchday: i32,
    pub max_active_players_per_team: i32,
}

impl From<SeasonModel> for SeasonDto {
    fn from(model: SeasonModel) -> Self {
        Self {
            id: model.id,
            tenant_id: model.tenant_id,
            name: model.name,
            start_date: model.start_date,
            end_date: model.end_date,
            status: model.status,
            current_matchday: model.current_matchday,
            max_active_players_per_team: model.max_active_players_per_team,
        }
    }
}

/// List the league's seasons, most recent first
#[utoipa::path(
    get,
    path = "/api/leagues/seasons",
    params(TenantHeader),
    responses(
        (status = 200, description = "Seasons of the active league", body = ApiResponse<Vec<SeasonDto>>),
        (status = 400, description = "No active tenant", body = ApiError)
    ),
    tag = "seasons"
)]
pub async fn list_seasons(
    State(state): State<AppState>,
    RequireTenant(_tenant): RequireTenant,
) -> Result<Json<ApiResponse<Vec<SeasonDto>>>, ApiError> {
    let conn = state.scoped_conn();
    let seasons = SeasonRepository::new(&conn).list_seasons().await?;
    Ok(Json(ApiResponse::new(
        seasons.into_iter().map(SeasonDto::from).collect(),
    )))
}

/// Create a draft season
#[utoipa::path(
    post,
    path = "/api/leagues/seasons",
    params(TenantHeader),
    request_body = CreateSeasonRequestDto,
    responses(
        (status = 201, description = "Season created", body = ApiResponse<SeasonDto>),
        (status = 400, description = "Validation failed or no active tenant", body = ApiError)
    ),
    tag = "seasons"
)]
pub async fn create_season(
    State(state): State<AppState>,
    RequireTenant(_tenant): RequireTenant,
    payload: Result<Json<CreateSeasonRequestDto>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<SeasonDto>>), ApiError> {
    let Json(request) = payload?;
    let conn = state.scoped_conn();
    let season = SeasonRepository::new(&conn)
        .create_season(CreateSeasonRequest {
            name: request.name,
            start_date: request.start_date,
            end_date: request.end_date,
            max_active_players_per_team: request.max_active_players_per_team,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(SeasonDto::from(season))),
    ))
}

/// Activate a season; other active seasons of the league are completed
#[utoipa::path(
    post,
    path = "/api/leagues/seasons/{id}/activate",
    params(
        TenantHeader,
        ("id" = Uuid, Path, description = "Season id")
    ),
    responses(
        (status = 200, description = "Season activated", body = ApiResponse<SeasonDto>),
        (status = 400, description = "Season is completed or no active tenant", body = ApiError),
        (status = 404, description = "No such season in this league", body = ApiError)
    ),
    tag = "seasons"
)]
pub async fn activate_season(
    State(state): State<AppState>,
    RequireTenant(_tenant): RequireTenant,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SeasonDto>>, ApiError> {
    let conn = state.scoped_conn();
    let season = SeasonRepository::new(&conn).activate_season(id).await?;
    Ok(Json(ApiResponse::new(SeasonDto::from(season))))
}

/// Move an active season to its next matchday
///
/// When the league enables automatic suspensions, suspensions that ended
/// before the new matchday are lifted.
#[utoipa::path(
    post,
    path = "/api/leagues/seasons/{id}/advance-matchday",
    params(
        TenantHeader,
        ("id" = Uuid, Path, description = "Season id")
    ),
    responses(
        (status = 200, description = "Matchday advanced", body = ApiResponse<SeasonDto>),
        (status = 400, description = "Season is not active or no active tenant", body = ApiError),
        (status = 404, description = "No such season in this league", body = ApiError)
    ),
    tag = "seasons"
)]
pub async fn advance_matchday(
    State(state): State<AppState>,
    RequireTenant(tenant): RequireTenant,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SeasonDto>>, ApiError> {
    let conn = state.scoped_conn();
    let season = SeasonRepository::new(&conn).advance_matchday(id).await?;

    let settings = TenantSettingsRepository::new(&conn).get_settings().await?;
    if settings.enable_auto_suspensions {
        let lifted = PlayerRepository::new(&conn)
            .lift_expired_suspensions(season.current_matchday)
            .await?;
        if lifted > 0 {
            tracing::info!(
                tenant_id = %tenant,
                season_id = %season.id,
                matchday = season.current_matchday,
                lifted,
                "Lifted expired suspensions"
            );
        }
    }

    Ok(Json(ApiResponse::new(SeasonDto::from(season))))
}
