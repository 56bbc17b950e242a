//! # Registration API Handlers
//!
//! Player registration, roster status and transfers within one league.

use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::types::{ApiResponse, TeamTarget};
use crate::models::player::Model as PlayerModel;
use crate::repositories::{PlayerRepository, RegisterPlayerRequest};
use crate::server::AppState;
use crate::tenancy::{RequireTenant, TenantHeader};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterPlayerRequestDto {
    #[schema(example = "Alex")]
    pub first_name: String,
    #[schema(example = "Morgan")]
    pub last_name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlayerDto {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub team_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// `active`, `inactive` or `suspended`
    pub status: String,
    pub suspended_until_matchday: Option<i32>,
}

impl From<PlayerModel> for PlayerDto {
    fn from(model: PlayerModel) -> Self {
        Self {
            id: model.id,
            tenant_id: model.tenant_id,
            team_id: model.team_id,
            first_name: model.first_name,
            last_name: model.last_name,
            status: model.status,
            suspended_until_matchday: model.suspended_until_matchday,
        }
    }
}

/// List a team's players
#[utoipa::path(
    get,
    path = "/api/registration/teams/{team_id}/players",
    params(
        TenantHeader,
        ("team_id" = Uuid, Path, description = "Team id")
    ),
    responses(
        (status = 200, description = "Players of the team", body = ApiResponse<Vec<PlayerDto>>),
        (status = 400, description = "No active tenant", body = ApiError),
        (status = 404, description = "No such team in this league", body = ApiError)
    ),
    tag = "registration"
)]
pub async fn list_team_players(
    State(state): State<AppState>,
    RequireTenant(_tenant): RequireTenant,
    Path(team_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<PlayerDto>>>, ApiError> {
    let conn = state.scoped_conn();
    let players = PlayerRepository::new(&conn)
        .list_team_players(team_id)
        .await?;
    Ok(Json(ApiResponse::new(
        players.into_iter().map(PlayerDto::from).collect(),
    )))
}

/// Register a player on a team
#[utoipa::path(
    post,
    path = "/api/registration/teams/{team_id}/players",
    params(
        TenantHeader,
        ("team_id" = Uuid, Path, description = "Team id")
    ),
    request_body = RegisterPlayerRequestDto,
    responses(
        (status = 201, description = "Player registered", body = ApiResponse<PlayerDto>),
        (status = 400, description = "Validation failed, roster full or no active tenant", body = ApiError),
        (status = 404, description = "No such team in this league", body = ApiError)
    ),
    tag = "registration"
)]
pub async fn register_player(
    State(state): State<AppState>,
    RequireTenant(_tenant): RequireTenant,
    Path(team_id): Path<Uuid>,
    payload: Result<Json<RegisterPlayerRequestDto>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<PlayerDto>>), ApiError> {
    let Json(request) = payload?;
    let conn = state.scoped_conn();
    let player = PlayerRepository::new(&conn)
        .register_player(
            team_id,
            RegisterPlayerRequest {
                first_name: request.first_name,
                last_name: request.last_name,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(PlayerDto::from(player))),
    ))
}

/// Transfer a player to another team of the same league
#[utoipa::path(
    post,
    path = "/api/registration/players/{id}/transfer",
    params(
        TenantHeader,
        ("id" = Uuid, Path, description = "Player id")
    ),
    request_body = TeamTarget,
    responses(
        (status = 200, description = "Player transferred and set inactive", body = ApiResponse<PlayerDto>),
        (status = 400, description = "Invalid target team or no active tenant", body = ApiError),
        (status = 404, description = "No such player or team in this league", body = ApiError)
    ),
    tag = "registration"
)]
pub async fn transfer_player(
    State(state): State<AppState>,
    RequireTenant(_tenant): RequireTenant,
    Path(id): Path<Uuid>,
    payload: Result<Json<TeamTarget>, JsonRejection>,
) -> Result<Json<ApiResponse<PlayerDto>>, ApiError> {
    let Json(target) = payload?;
    let conn = state.scoped_conn();
    let player = PlayerRepository::new(&conn)
        .transfer_player(id, target.team_id)
        .await?;
    Ok(Json(ApiResponse::new(PlayerDto::from(player))))
}

/// Put an inactive player back on the active roster
#[utoipa::path(
    patch,
    path = "/api/registration/players/{id}/activate",
    params(
        TenantHeader,
        ("id" = Uuid, Path, description = "Player id")
    ),
    responses(
        (status = 200, description = "Player is active", body = ApiResponse<PlayerDto>),
        (status = 400, description = "Roster full, player suspended or no active tenant", body = ApiError),
        (status = 404, description = "No such player in this league", body = ApiError)
    ),
    tag = "registration"
)]
pub async fn activate_player(
    State(state): State<AppState>,
    RequireTenant(_tenant): RequireTenant,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PlayerDto>>, ApiError> {
    let conn = state.scoped_conn();
    let player = PlayerRepository::new(&conn).activate_player(id).await?;
    Ok(Json(ApiResponse::new(PlayerDto::from(player))))
}

/// Take a player off the active roster
#[utoipa::path(
    patch,
    path = "/api/registration/players/{id}/deactivate",
    params(
        TenantHeader,
        ("id" = Uuid, Path, description = "Player id")
    ),
    responses(
        (status = 200, description = "Player is inactive", body = ApiResponse<PlayerDto>),
        (status = 400, description = "Player suspended or no active tenant", body = ApiError),
        (status = 404, description = "No such player in this league", body = ApiError)
    ),
    tag = "registration"
)]
pub async fn deactivate_player(
    State(state): State<AppState>,
    RequireTenant(_tenant): RequireTenant,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PlayerDto>>, ApiError> {
    let conn = state.scoped_conn();
    let player = PlayerRepository::new(&conn).deactivate_player(id).await?;
    Ok(Json(ApiResponse::new(PlayerDto::from(player))))
}
