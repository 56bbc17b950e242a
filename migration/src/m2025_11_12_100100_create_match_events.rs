//! Migration to create the match_events table.

use sea_orm_migration::prelude::*;

use crate::m2024_01_01_000001_create_tenants::Tenants;
use crate::m2025_11_10_090000_create_teams::Teams;
use crate::m2025_11_10_090200_create_players::Players;
use crate::m2025_11_10_090300_create_matches::Matches;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MatchEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MatchEvents::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MatchEvents::TenantId).uuid().not_null())
                    .col(ColumnDef::new(MatchEvents::MatchId).uuid().not_null())
                    .col(ColumnDef::new(MatchEvents::TeamId).uuid().not_null())
                    .col(ColumnDef::new(MatchEvents::PlayerId).uuid().null())
                    .col(ColumnDef::new(MatchEvents::EventType).text().not_null())
                    .col(
                        ColumnDef::new(MatchEvents::SuspensionMatchdays)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(MatchEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_match_events_tenant_id")
                            .from(MatchEvents::Table, MatchEvents::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_match_events_match_id")
                            .from(MatchEvents::Table, MatchEvents::MatchId)
                            .to(Matches::Table, Matches::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_match_events_team_id")
                            .from(MatchEvents::Table, MatchEvents::TeamId)
                            .to(Teams::Table, Teams::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_match_events_player_id")
                            .from(MatchEvents::Table, MatchEvents::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_match_events_tenant_match")
                    .table(MatchEvents::Table)
                    .col(MatchEvents::TenantId)
                    .col(MatchEvents::MatchId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_match_events_tenant_match")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(MatchEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MatchEvents {
    Table,
    Id,
    TenantId,
    MatchId,
    TeamId,
    PlayerId,
    EventType,
    SuspensionMatchdays,
    CreatedAt,
}
