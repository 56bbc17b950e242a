//! # Tenant Settings Model
//!
//! Per-league presentation and rule toggles, one row per tenant.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::tenancy::TenantAware;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tenant_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub tenant_id: Uuid,

    pub show_offense_defense_widgets: bool,

    pub show_discipline_widget: bool,

    pub enable_auto_suspensions: bool,

    pub min_matches_for_playoffs: i32,

    pub theme_class: String,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenant::Entity",
        from = "Column::TenantId",
        to = "super::tenant::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Tenant,
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TenantAware for Entity {
    const COLLECTION: &'static str = "tenant_settings";

    fn tenant_column() -> Column {
        Column::TenantId
    }

    fn id_column() -> Column {
        Column::Id
    }
}

/// Settings values without storage bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SettingsValues {
    pub show_offense_defense_widgets: bool,
    pub show_discipline_widget: bool,
    pub enable_auto_suspensions: bool,
    pub min_matches_for_playoffs: i32,
    pub theme_class: String,
}

impl Default for SettingsValues {
    fn default() -> Self {
        Self {
            show_offense_defense_widgets: true,
            show_discipline_widget: true,
            enable_auto_suspensions: true,
            min_matches_for_playoffs: 0,
            theme_class: "theme-default".to_string(),
        }
    }
}

impl From<&Model> for SettingsValues {
    fn from(model: &Model) -> Self {
        Self {
            show_offense_defense_widgets: model.show_offense_defense_widgets,
            show_discipline_widget: model.show_discipline_widget,
            enable_auto_suspensions: model.enable_auto_suspensions,
            min_matches_for_playoffs: model.min_matches_for_playoffs,
            theme_class: model.theme_class.clone(),
        }
    }
}
