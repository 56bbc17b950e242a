//! Season entity model and lifecycle status.

use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::tenancy::TenantAware;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "seasons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub tenant_id: Uuid,

    pub name: String,

    pub start_date: Date,

    pub end_date: Date,

    /// One of [`SeasonStatus`], stored as text
    pub status: String,

    /// Matchday currently being played, starting at 1
    pub current_matchday: i32,

    /// Roster limit enforced when registering players
    pub max_active_players_per_team: i32,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn status(&self) -> Option<SeasonStatus> {
        self.status.parse().ok()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenant::Entity",
        from = "Column::TenantId",
        to = "super::tenant::Column::Id",
        on_delete = "Cascade"
    )]
    Tenant,
    #[sea_orm(has_many = "super::fixture::Entity")]
    Fixtures,
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl Related<super::fixture::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fixtures.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TenantAware for Entity {
    const COLLECTION: &'static str = "seasons";

    fn tenant_column() -> Column {
        Column::TenantId
    }

    fn id_column() -> Column {
        Column::Id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SeasonStatus {
    Draft,
    Active,
    Completed,
}

impl SeasonStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SeasonStatus::Draft => "draft",
            SeasonStatus::Active => "active",
            SeasonStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SeasonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeasonStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(SeasonStatus::Draft),
            "active" => Ok(SeasonStatus::Active),
            "completed" => Ok(SeasonStatus::Completed),
            other => Err(format!("unknown season status '{other}'")),
        }
    }
}
