//! Tenant entity model
//!
//! One row per league. The collection is tenant-agnostic: it is only read and
//! written through [`Exemption`](crate::tenancy::Exemption)s.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tenants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// League display name
    pub name: String,

    /// Sport played in the league, e.g. `soccer`
    pub sport_type: String,

    /// Unique subdomain the league is served under
    #[sea_orm(unique)]
    pub subdomain: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::team::Entity")]
    Teams,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teams.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
