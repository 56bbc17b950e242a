//! Match event entity model
//!
//! Events come from a submitted match report. The team is always one of the
//! match's two teams; the player, when present, plays for that team.

use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::tenancy::TenantAware;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "match_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub tenant_id: Uuid,

    pub match_id: Uuid,

    pub team_id: Uuid,

    #[sea_orm(nullable)]
    pub player_id: Option<Uuid>,

    /// One of [`MatchEventType`], stored as text
    pub event_type: String,

    /// Matchdays a red card suspends the player for
    #[sea_orm(nullable)]
    pub suspension_matchdays: Option<i32>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::fixture::Entity",
        from = "Column::MatchId",
        to = "super::fixture::Column::Id",
        on_delete = "Cascade"
    )]
    Fixture,
}

impl Related<super::fixture::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fixture.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TenantAware for Entity {
    const COLLECTION: &'static str = "match_events";

    fn tenant_column() -> Column {
        Column::TenantId
    }

    fn id_column() -> Column {
        Column::Id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchEventType {
    Goal,
    YellowCard,
    RedCard,
    Appearance,
}

impl MatchEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchEventType::Goal => "goal",
            MatchEventType::YellowCard => "yellow_card",
            MatchEventType::RedCard => "red_card",
            MatchEventType::Appearance => "appearance",
        }
    }
}

impl fmt::Display for MatchEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "goal" => Ok(MatchEventType::Goal),
            "yellow_card" => Ok(MatchEventType::YellowCard),
            "red_card" => Ok(MatchEventType::RedCard),
            "appearance" => Ok(MatchEventType::Appearance),
            other => Err(format!("unknown match event type '{other}'")),
        }
    }
}
