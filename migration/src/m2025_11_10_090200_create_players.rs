//! Migration to create the players table.

use sea_orm_migration::prelude::*;

use crate::m2024_01_01_000001_create_tenants::Tenants;
use crate::m2025_11_10_090000_create_teams::Teams;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Players::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Players::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Players::TeamId).uuid().not_null())
                    .col(ColumnDef::new(Players::FirstName).text().not_null())
                    .col(ColumnDef::new(Players::LastName).text().not_null())
                    .col(
                        ColumnDef::new(Players::Status)
                            .text()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Players::SuspendedUntilMatchday)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Players::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_players_tenant_id")
                            .from(Players::Table, Players::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_players_team_id")
                            .from(Players::Table, Players::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_players_tenant_team")
                    .table(Players::Table)
                    .col(Players::TenantId)
                    .col(Players::TeamId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_players_tenant_team").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Players::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Players {
    Table,
    Id,
    TenantId,
    TeamId,
    FirstName,
    LastName,
    Status,
    SuspendedUntilMatchday,
    CreatedAt,
}
