//! Match (fixture) entity model
//!
//! A fixture references a season and two teams. All three must belong to the
//! fixture's own tenant; see
//! [`FixtureRepository::assemble`](crate::repositories::FixtureRepository::assemble).

use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::tenancy::TenantAware;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "matches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub tenant_id: Uuid,

    pub season_id: Uuid,

    /// Round the fixture belongs to, when generated from a schedule
    #[sea_orm(nullable)]
    pub matchday: Option<i32>,

    pub home_team_id: Uuid,

    pub away_team_id: Uuid,

    pub match_date: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub home_score: Option<i32>,

    #[sea_orm(nullable)]
    pub away_score: Option<i32>,

    /// One of [`FixtureStatus`], stored as text
    pub status: String,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn status(&self) -> Option<FixtureStatus> {
        self.status.parse().ok()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::season::Entity",
        from = "Column::SeasonId",
        to = "super::season::Column::Id",
        on_delete = "Cascade"
    )]
    Season,
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::HomeTeamId",
        to = "super::team::Column::Id"
    )]
    HomeTeam,
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::AwayTeamId",
        to = "super::team::Column::Id"
    )]
    AwayTeam,
}

impl Related<super::season::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Season.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TenantAware for Entity {
    const COLLECTION: &'static str = "matches";

    fn tenant_column() -> Column {
        Column::TenantId
    }

    fn id_column() -> Column {
        Column::Id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FixtureStatus {
    Scheduled,
    InProgress,
    Finished,
    Cancelled,
}

impl FixtureStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FixtureStatus::Scheduled => "scheduled",
            FixtureStatus::InProgress => "in_progress",
            FixtureStatus::Finished => "finished",
            FixtureStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FixtureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FixtureStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(FixtureStatus::Scheduled),
            "in_progress" => Ok(FixtureStatus::InProgress),
            "finished" => Ok(FixtureStatus::Finished),
            "cancelled" => Ok(FixtureStatus::Cancelled),
            other => Err(format!("unknown match status '{other}'")),
        }
    }
}
