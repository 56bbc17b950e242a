//! # Teams API Handlers

use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::types::ApiResponse;
use crate::models::team::Model as TeamModel;
use crate::repositories::{CreateTeamRequest, TeamRepository};
use crate::server::AppState;
use crate::tenancy::{RequireTenant, TenantHeader};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTeamRequestDto {
    #[schema(example = "Eagles")]
    pub name: String,
    pub logo_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TeamDto {
    pub id: Uuid,
    pub tenant_id: Uuid,
    #[schema(example = "Eagles")]
    pub name: String,
    pub logo_url: Option<String>,
    pub created_at: String,
}

impl From<TeamModel> for TeamDto {
    fn from(model: TeamModel) -> Self {
        Self {
            id: model.id,
            tenant_id: model.tenant_id,
            name: model.name,
            logo_url: model.logo_url,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

/// List the league's teams
#[utoipa::path(
    get,
    path = "/api/leagues/teams",
    params(TenantHeader),
    responses(
        (status = 200, description = "Teams of the active league", body = ApiResponse<Vec<TeamDto>>),
        (status = 400, description = "No active tenant", body = ApiError)
    ),
    tag = "teams"
)]
pub async fn list_teams(
    State(state): State<AppState>,
    RequireTenant(_tenant): RequireTenant,
) -> Result<Json<ApiResponse<Vec<TeamDto>>>, ApiError> {
    let conn = state.scoped_conn();
    let teams = TeamRepository::new(&conn).list_teams().await?;
    Ok(Json(ApiResponse::new(
        teams.into_iter().map(TeamDto::from).collect(),
    )))
}

/// Create a team in the active league
#[utoipa::path(
    post,
    path = "/api/leagues/teams",
    params(TenantHeader),
    request_body = CreateTeamRequestDto,
    responses(
        (status = 201, description = "Team created", body = ApiResponse<TeamDto>),
        (status = 400, description = "Validation failed or no active tenant", body = ApiError),
        (status = 409, description = "Team name already used in this league", body = ApiError)
    ),
    tag = "teams"
)]
pub async fn create_team(
    State(state): State<AppState>,
    RequireTenant(_tenant): RequireTenant,
    payload: Result<Json<CreateTeamRequestDto>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<TeamDto>>), ApiError> {
    let Json(request) = payload?;
    let conn = state.scoped_conn();
    let team = TeamRepository::new(&conn)
        .create_team(CreateTeamRequest {
            name: request.name,
            logo_url: request.logo_url,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(TeamDto::from(team))),
    ))
}

/// Get one team of the active league
#[utoipa::path(
    get,
    path = "/api/leagues/teams/{id}",
    params(
        TenantHeader,
        ("id" = Uuid, Path, description = "Team id")
    ),
    responses(
        (status = 200, description = "Team found", body = ApiResponse<TeamDto>),
        (status = 400, description = "No active tenant", body = ApiError),
        (status = 404, description = "No such team in this league", body = ApiError)
    ),
    tag = "teams"
)]
pub async fn get_team(
    State(state): State<AppState>,
    RequireTenant(_tenant): RequireTenant,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TeamDto>>, ApiError> {
    let conn = state.scoped_conn();
    let team = TeamRepository::new(&conn).get_team(id).await?;
    Ok(Json(ApiResponse::new(TeamDto::from(team))))
}
