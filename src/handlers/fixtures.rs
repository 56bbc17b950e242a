//! # Competition API Handlers
//!
//! Match scheduling, results, match reports and calendar generation.

use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::types::ApiResponse;
use crate::models::fixture::Model as FixtureModel;
use crate::models::match_event::{MatchEventType, Model as MatchEventModel};
use crate::repositories::{FixtureRepository, MatchReport, ReportEvent, ScheduleMatchRequest};
use crate::server::AppState;
use crate::tenancy::{RequireTenant, TenantHeader};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScheduleMatchRequestDto {
    pub season_id: Uuid,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    /// Kickoff (RFC 3339)
    #[schema(value_type = String, format = DateTime, example = "2025-03-01T10:00:00Z")]
    pub match_date: DateTime<FixedOffset>,
    pub matchday: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MatchResultDto {
    #[schema(minimum = 0)]
    pub home_score: i32,
    #[schema(minimum = 0)]
    pub away_score: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MatchDto {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub season_id: Uuid,
    pub matchday: Option<i32>,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    /// Kickoff (RFC 3339)
    pub match_date: String,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    /// `scheduled`, `in_progress`, `finished` or `cancelled`
    pub status: String,
}

impl From<FixtureModel> for MatchDto {
    fn from(model: FixtureModel) -> Self {
        Self {
            id: model.id,
            tenant_id: model.tenant_id,
            season_id: model.season_id,
            matchday: model.matchday,
            home_team_id: model.home_team_id,
            away_team_id: model.away_team_id,
            match_date: model.match_date.to_rfc3339(),
            home_score: model.home_score,
            away_score: model.away_score,
            status: model.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MatchEventDto {
    pub team_id: Uuid,
    pub player_id: Option<Uuid>,
    pub event_type: MatchEventType,
    /// Red cards only; defaults to 1
    #[schema(minimum = 1)]
    pub suspension_matchdays: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StoredMatchEventDto {
    pub id: Uuid,
    pub match_id: Uuid,
    pub team_id: Uuid,
    pub player_id: Option<Uuid>,
    /// `goal`, `yellow_card`, `red_card` or `appearance`
    pub event_type: String,
    pub suspension_matchdays: Option<i32>,
}

impl From<MatchEventModel> for StoredMatchEventDto {
    fn from(model: MatchEventModel) -> Self {
        Self {
            id: model.id,
            match_id: model.match_id,
            team_id: model.team_id,
            player_id: model.player_id,
            event_type: model.event_type,
            suspension_matchdays: model.suspension_matchdays,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MatchReportRequestDto {
    pub events: Vec<MatchEventDto>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MatchReportDto {
    #[serde(rename = "match")]
    pub fixture: MatchDto,
    pub events: Vec<StoredMatchEventDto>,
    /// Players suspended by red cards in this report
    pub suspended_players: Vec<Uuid>,
}

impl From<MatchReport> for MatchReportDto {
    fn from(report: MatchReport) -> Self {
        Self {
            fixture: MatchDto::from(report.fixture),
            events: report
                .events
                .into_iter()
                .map(StoredMatchEventDto::from)
                .collect(),
            suspended_players: report.suspended_players,
        }
    }
}

/// Schedule a match between two teams of the active league
#[utoipa::path(
    post,
    path = "/api/competition/matches",
    params(TenantHeader),
    request_body = ScheduleMatchRequestDto,
    responses(
        (status = 201, description = "Match scheduled", body = ApiResponse<MatchDto>),
        (status = 400, description = "Validation failed, cross-tenant reference or no active tenant", body = ApiError),
        (status = 404, description = "Season or team not found in this league", body = ApiError)
    ),
    tag = "competition"
)]
pub async fn schedule_match(
    State(state): State<AppState>,
    RequireTenant(_tenant): RequireTenant,
    payload: Result<Json<ScheduleMatchRequestDto>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<MatchDto>>), ApiError> {
    let Json(request) = payload?;
    let conn = state.scoped_conn();
    let fixture = FixtureRepository::new(&conn)
        .schedule_match(ScheduleMatchRequest {
            season_id: request.season_id,
            home_team_id: request.home_team_id,
            away_team_id: request.away_team_id,
            match_date: request.match_date,
            matchday: request.matchday,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(MatchDto::from(fixture))),
    ))
}

/// List a season's matches in kickoff order
#[utoipa::path(
    get,
    path = "/api/competition/seasons/{season_id}/matches",
    params(
        TenantHeader,
        ("season_id" = Uuid, Path, description = "Season id")
    ),
    responses(
        (status = 200, description = "Matches of the season", body = ApiResponse<Vec<MatchDto>>),
        (status = 400, description = "No active tenant", body = ApiError),
        (status = 404, description = "No such season in this league", body = ApiError)
    ),
    tag = "competition"
)]
pub async fn list_season_matches(
    State(state): State<AppState>,
    RequireTenant(_tenant): RequireTenant,
    Path(season_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<MatchDto>>>, ApiError> {
    let conn = state.scoped_conn();
    let fixtures = FixtureRepository::new(&conn)
        .list_season_matches(season_id)
        .await?;
    Ok(Json(ApiResponse::new(
        fixtures.into_iter().map(MatchDto::from).collect(),
    )))
}

/// Record the final score of a match
#[utoipa::path(
    post,
    path = "/api/competition/matches/{id}/result",
    params(
        TenantHeader,
        ("id" = Uuid, Path, description = "Match id")
    ),
    request_body = MatchResultDto,
    responses(
        (status = 200, description = "Result recorded", body = ApiResponse<MatchDto>),
        (status = 400, description = "Negative score, cancelled match or no active tenant", body = ApiError),
        (status = 404, description = "No such match in this league", body = ApiError)
    ),
    tag = "competition"
)]
pub async fn record_result(
    State(state): State<AppState>,
    RequireTenant(_tenant): RequireTenant,
    Path(id): Path<Uuid>,
    payload: Result<Json<MatchResultDto>, JsonRejection>,
) -> Result<Json<ApiResponse<MatchDto>>, ApiError> {
    let Json(result) = payload?;
    let conn = state.scoped_conn();
    let fixture = FixtureRepository::new(&conn)
        .record_result(id, result.home_score, result.away_score)
        .await?;
    Ok(Json(ApiResponse::new(MatchDto::from(fixture))))
}

/// Generate a round-robin calendar for the season
#[utoipa::path(
    post,
    path = "/api/competition/seasons/{season_id}/fixtures/generate",
    params(
        TenantHeader,
        ("season_id" = Uuid, Path, description = "Season id")
    ),
    responses(
        (status = 201, description = "Calendar generated", body = ApiResponse<Vec<MatchDto>>),
        (status = 400, description = "Too few teams, season already scheduled or no active tenant", body = ApiError),
        (status = 404, description = "No such season in this league", body = ApiError)
    ),
    tag = "competition"
)]
pub async fn generate_fixtures(
    State(state): State<AppState>,
    RequireTenant(_tenant): RequireTenant,
    Path(season_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<MatchDto>>>), ApiError> {
    let conn = state.scoped_conn();
    let fixtures = FixtureRepository::new(&conn)
        .generate_round_robin(season_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            fixtures.into_iter().map(MatchDto::from).collect(),
        )),
    ))
}

/// List the active season's matches on one matchday
#[utoipa::path(
    get,
    path = "/api/competition/matchdays/{matchday}/matches",
    params(
        TenantHeader,
        ("matchday" = i32, Path, description = "Matchday, starting at 1")
    ),
    responses(
        (status = 200, description = "Matches of the matchday", body = ApiResponse<Vec<MatchDto>>),
        (status = 400, description = "Invalid matchday or no active tenant", body = ApiError),
        (status = 404, description = "The league has no active season", body = ApiError)
    ),
    tag = "competition"
)]
pub async fn list_matchday_matches(
    State(state): State<AppState>,
    RequireTenant(_tenant): RequireTenant,
    Path(matchday): Path<i32>,
) -> Result<Json<ApiResponse<Vec<MatchDto>>>, ApiError> {
    let conn = state.scoped_conn();
    let fixtures = FixtureRepository::new(&conn)
        .list_matchday_matches(matchday)
        .await?;
    Ok(Json(ApiResponse::new(
        fixtures.into_iter().map(MatchDto::from).collect(),
    )))
}

/// Submit a match report: events, final score and red-card suspensions
#[utoipa::path(
    post,
    path = "/api/competition/matches/{id}/report",
    params(
        TenantHeader,
        ("id" = Uuid, Path, description = "Match id")
    ),
    request_body = MatchReportRequestDto,
    responses(
        (status = 200, description = "Report stored and match finished", body = ApiResponse<MatchReportDto>),
        (status = 400, description = "Invalid event, cross-tenant reference, cancelled match or no active tenant", body = ApiError),
        (status = 404, description = "No such match or player in this league", body = ApiError)
    ),
    tag = "competition"
)]
pub async fn submit_report(
    State(state): State<AppState>,
    RequireTenant(_tenant): RequireTenant,
    Path(id): Path<Uuid>,
    payload: Result<Json<MatchReportRequestDto>, JsonRejection>,
) -> Result<Json<ApiResponse<MatchReportDto>>, ApiError> {
    let Json(report) = payload?;
    let events = report
        .events
        .into_iter()
        .map(|event| ReportEvent {
            team_id: event.team_id,
            player_id: event.player_id,
            event_type: event.event_type,
            suspension_matchdays: event.suspension_matchdays,
        })
        .collect();

    let conn = state.scoped_conn();
    let report = FixtureRepository::new(&conn)
        .submit_report(id, events)
        .await?;
    Ok(Json(ApiResponse::new(MatchReportDto::from(report))))
}
