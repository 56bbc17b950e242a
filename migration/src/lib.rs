//! Database migrations for the LeagueOS backend.
//!
//! Every tenant-aware table carries a non-null `tenant_id` column next to its
//! primary key, plus an index leading with `tenant_id`.

pub use sea_orm_migration::prelude::*;

mod m2024_01_01_000001_create_tenants;
mod m2025_11_10_090000_create_teams;
mod m2025_11_10_090100_create_seasons;
mod m2025_11_10_090200_create_players;
mod m2025_11_10_090300_create_matches;
mod m2025_11_10_090400_create_tenant_settings;
mod m2025_11_12_100000_add_match_calendar_guard;
mod m2025_11_12_100100_create_match_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2024_01_01_000001_create_tenants::Migration),
            Box::new(m2025_11_10_090000_create_teams::Migration),
            Box::new(m2025_11_10_090100_create_seasons::Migration),
            Box::new(m2025_11_10_090200_create_players::Migration),
            Box::new(m2025_11_10_090300_create_matches::Migration),
            Box::new(m2025_11_10_090400_create_tenant_settings::Migration),
            Box::new(m2025_11_12_100000_add_match_calendar_guard::Migration),
            Box::new(m2025_11_12_100100_create_match_events::Migration),
        ]
    }
}
