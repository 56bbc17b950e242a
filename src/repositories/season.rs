//! # Season Repository
//!
//! Season lifecycle: `draft` → `active` → `completed`. At most one season per
//! tenant is active; activating one completes the others in the same
//! transaction, with the tenant's season rows locked.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::season::{
    ActiveModel as SeasonActiveModel, Column as SeasonColumn, Entity as Season,
    Model as SeasonModel, SeasonStatus,
};
use crate::tenancy::{ScopeError, ScopedConn, TenantAware};

/// Roster limit applied when a season does not set one.
pub const DEFAULT_MAX_ACTIVE_PLAYERS: i32 = 26;

#[derive(Debug, Clone)]
pub struct CreateSeasonRequest {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub max_active_players_per_team: Option<i32>,
}

pub struct SeasonRepository<'a, C = DatabaseConnection> {
    conn: &'a ScopedConn<C>,
}

impl<'a, C> SeasonRepository<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'a ScopedConn<C>) -> Self {
        Self { conn }
    }

    /// Most recent season first
    pub async fn list_seasons(&self) -> Result<Vec<SeasonModel>, RepositoryError> {
        let seasons = self
            .conn
            .find_all(Season::find().order_by_desc(SeasonColumn::StartDate))
            .await?;
        Ok(seasons)
    }

    pub async fn create_season(
        &self,
        request: CreateSeasonRequest,
    ) -> Result<SeasonModel, RepositoryError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(RepositoryError::invalid_field(
                "name",
                "Season name cannot be empty",
            ));
        }
        if request.end_date < request.start_date {
            return Err(RepositoryError::invalid_field(
                "end_date",
                "Season cannot end before it starts",
            ));
        }
        let max_players = request
            .max_active_players_per_team
            .unwrap_or(DEFAULT_MAX_ACTIVE_PLAYERS);
        if max_players < 1 {
            return Err(RepositoryError::invalid_field(
                "max_active_players_per_team",
                "Roster limit must be at least 1",
            ));
        }

        let season = SeasonActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: NotSet,
            name: Set(name.to_string()),
            start_date: Set(request.start_date),
            end_date: Set(request.end_date),
            status: Set(SeasonStatus::Draft.as_str().to_string()),
            current_matchday: Set(1),
            max_active_players_per_team: Set(max_players),
            created_at: Set(Utc::now().into()),
        };

        Ok(self.conn.insert::<Season>(season).await?)
    }

    pub async fn get_season(&self, id: Uuid) -> Result<SeasonModel, RepositoryError> {
        Ok(self.conn.find_by_id::<Season>(id).await?)
    }

    /// The active tenant's running season, if any
    pub async fn active_season(&self) -> Result<Option<SeasonModel>, RepositoryError> {
        let season = self
            .conn
            .find_one(
                Season::find().filter(SeasonColumn::Status.eq(SeasonStatus::Active.as_str())),
            )
            .await?;
        Ok(season)
    }

    /// Marks `id` active and completes every other active season of the tenant.
    pub async fn activate_season(&self, id: Uuid) -> Result<SeasonModel, RepositoryError> {
        let txn = self.conn.begin().await?;

        // Locking every season of the tenant serializes concurrent activations.
        let season = txn
            .find_all(Season::find().lock_exclusive())
            .await?
            .into_iter()
            .find(|season| season.id == id)
            .ok_or(ScopeError::NotFound {
                collection: Season::collection(),
                id,
            })?;
        if season.status() == Some(SeasonStatus::Completed) {
            return Err(RepositoryError::invalid_field(
                "status",
                "A completed season cannot be reactivated",
            ));
        }

        let completed = txn
            .update_many(
                Season::update_many()
                    .col_expr(
                        SeasonColumn::Status,
                        Expr::value(SeasonStatus::Completed.as_str()),
                    )
                    .filter(SeasonColumn::Status.eq(SeasonStatus::Active.as_str()))
                    .filter(SeasonColumn::Id.ne(id)),
            )
            .await?;

        let mut season = season.into_active_model();
        season.status = Set(SeasonStatus::Active.as_str().to_string());
        let season = txn.update::<Season>(season).await?;
        txn.commit().await?;

        if completed > 0 {
            tracing::info!(season_id = %id, completed, "Completed previously active seasons");
        }
        Ok(season)
    }

    /// Moves an active season to its next matchday.
    pub async fn advance_matchday(&self, id: Uuid) -> Result<SeasonModel, RepositoryError> {
        let season = self.get_season(id).await?;
        if season.status() != Some(SeasonStatus::Active) {
            return Err(RepositoryError::invalid_field(
                "status",
                "Only an active season can advance its matchday",
            ));
        }

        let next = season.current_matchday + 1;
        let mut season = season.into_active_model();
        season.current_matchday = Set(next);
        Ok(self.conn.update::<Season>(season).await?)
    }
}
