//! Migration to create the matches table.
//!
//! A match links one season and two teams; all three must belong to the
//! same tenant as the match row itself. The database only enforces the
//! foreign keys, the tenant agreement is checked by the application before
//! the row is written.

use sea_orm_migration::prelude::*;

use crate::m2024_01_01_000001_create_tenants::Tenants;
use crate::m2025_11_10_090000_create_teams::Teams;
use crate::m2025_11_10_090100_create_seasons::Seasons;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Matches::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Matches::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Matches::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Matches::SeasonId).uuid().not_null())
                    .col(ColumnDef::new(Matches::Matchday).integer().null())
                    .col(ColumnDef::new(Matches::HomeTeamId).uuid().not_null())
                    .col(ColumnDef::new(Matches::AwayTeamId).uuid().not_null())
                    .col(
                        ColumnDef::new(Matches::MatchDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Matches::HomeScore).integer().null())
                    .col(ColumnDef::new(Matches::AwayScore).integer().null())
                    .col(
                        ColumnDef::new(Matches::Status)
                            .text()
                            .not_null()
                            .default("scheduled"),
                    )
                    .col(
                        ColumnDef::new(Matches::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_matches_tenant_id")
                            .from(Matches::Table, Matches::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_matches_season_id")
                            .from(Matches::Table, Matches::SeasonId)
                            .to(Seasons::Table, Seasons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_matches_home_team_id")
                            .from(Matches::Table, Matches::HomeTeamId)
                            .to(Teams::Table, Teams::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_matches_away_team_id")
                            .from(Matches::Table, Matches::AwayTeamId)
                            .to(Teams::Table, Teams::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_matches_tenant_season")
                    .table(Matches::Table)
                    .col(Matches::TenantId)
                    .col(Matches::SeasonId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_matches_tenant_season").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Matches::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Matches {
    Table,
    Id,
    TenantId,
    SeasonId,
    Matchday,
    HomeTeamId,
    AwayTeamId,
    MatchDate,
    HomeScore,
    AwayScore,
    Status,
    CreatedAt,
}
