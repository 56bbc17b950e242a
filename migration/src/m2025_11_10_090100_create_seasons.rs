//! Migration to create the seasons table.

use sea_orm_migration::prelude::*;

use crate::m2024_01_01_000001_create_tenants::Tenants;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Seasons::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Seasons::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Seasons::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Seasons::Name).text().not_null())
                    .col(ColumnDef::new(Seasons::StartDate).date().not_null())
                    .col(ColumnDef::new(Seasons::EndDate).date().not_null())
                    .col(
                        ColumnDef::new(Seasons::Status)
                            .text()
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(Seasons::CurrentMatchday)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Seasons::MaxActivePlayersPerTeam)
                            .integer()
                            .not_null()
                            .default(26),
                    )
                    .col(
                        ColumnDef::new(Seasons::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_seasons_tenant_id")
                            .from(Seasons::Table, Seasons::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_seasons_tenant_id")
                    .table(Seasons::Table)
                    .col(Seasons::TenantId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_seasons_tenant_id").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Seasons::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Seasons {
    Table,
    Id,
    TenantId,
    Name,
    StartDate,
    EndDate,
    Status,
    CurrentMatchday,
    MaxActivePlayersPerTeam,
    CreatedAt,
}
