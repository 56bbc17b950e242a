//! Adds unique indexes so a team plays at most one home and one away match
//! per season matchday.
//!
//! Matches without a matchday are not covered; NULLs never collide.

use sea_orm_migration::prelude::*;

use crate::m2025_11_10_090300_create_matches::Matches;

const HOME_SLOT_INDEX: &str = "idx_matches_home_slot";
const AWAY_SLOT_INDEX: &str = "idx_matches_away_slot";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name(HOME_SLOT_INDEX)
                    .table(Matches::Table)
                    .col(Matches::TenantId)
                    .col(Matches::SeasonId)
                    .col(Matches::Matchday)
                    .col(Matches::HomeTeamId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(AWAY_SLOT_INDEX)
                    .table(Matches::Table)
                    .col(Matches::TenantId)
                    .col(Matches::SeasonId)
                    .col(Matches::Matchday)
                    .col(Matches::AwayTeamId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name(AWAY_SLOT_INDEX).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name(HOME_SLOT_INDEX).to_owned())
            .await
    }
}
