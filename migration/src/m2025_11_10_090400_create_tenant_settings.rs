//! Migration to create the tenant_settings table (one row per tenant).

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
                    .table(TenantSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TenantSettings::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TenantSettings::TenantId).uuid().not_null())
                    .col(
                        ColumnDef::new(TenantSettings::ShowOffenseDefenseWidgets)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(TenantSettings::ShowDisciplineWidget)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(TenantSettings::EnableAutoSuspensions)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(TenantSettings::MinMatchesForPlayoffs)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TenantSettings::ThemeClass)
                            .text()
                            .not_null()
                            .default("theme-default"),
                    )
                    .col(
                        ColumnDef::new(TenantSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenant_settings_tenant_id")
                            .from(TenantSettings::Table, TenantSettings::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tenant_settings_tenant_id")
                    .table(TenantSettings::Table)
                    .col(TenantSettings::TenantId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_tenant_settings_tenant_id")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(TenantSettings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TenantSettings {
    Table,
    Id,
    TenantId,
    ShowOffenseDefenseWidgets,
    ShowDisciplineWidget,
    EnableAutoSuspensions,
    MinMatchesForPlayoffs,
    ThemeClass,
    UpdatedAt,
}
