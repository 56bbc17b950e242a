//! # Player Repository
//!
//! Registration and transfers. A player always belongs to a team of the same
//! tenant; transfers check that explicitly before writing.

use chrono::Utc;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::player::{
    ActiveModel as PlayerActiveModel, Column as PlayerColumn, Entity as Player,
    Model as PlayerModel, PlayerStatus,
};
use crate::models::team::Entity as Team;
use crate::repositories::season::{DEFAULT_MAX_ACTIVE_PLAYERS, SeasonRepository};
use crate::tenancy::{ScopedConn, TenantLinks, tenant_of};

#[derive(Debug, Clone)]
pub struct RegisterPlayerRequest {
    pub first_name: String,
    pub last_name: String,
}

pub struct PlayerRepository<'a, C = DatabaseConnection> {
    conn: &'a ScopedConn<C>,
}

impl<'a, C> PlayerRepository<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'a ScopedConn<C>) -> Self {
        Self { conn }
    }

    pub async fn list_team_players(
        &self,
        team_id: Uuid,
    ) -> Result<Vec<PlayerModel>, RepositoryError> {
        self.conn.find_by_id::<Team>(team_id).await?;
        let players = self
            .conn
            .find_all(
                Player::find()
                    .filter(PlayerColumn::TeamId.eq(team_id))
                    .order_by_asc(PlayerColumn::LastName)
                    .order_by_asc(PlayerColumn::FirstName),
            )
            .await?;
        Ok(players)
    }

    /// Registers an active player, honouring the active season's roster limit.
    pub async fn register_player(
        &self,
        team_id: Uuid,
        request: RegisterPlayerRequest,
    ) -> Result<PlayerModel, RepositoryError> {
        let first_name = required_name("first_name", &request.first_name)?;
        let last_name = required_name("last_name", &request.last_name)?;

        let owner = self.conn.writing_tenant::<Player>()?;
        let txn = self.conn.begin().await?;
        let team = txn.lock_by_id::<Team>(team_id).await?;
        TenantLinks::owned_by(owner)
            .link("team_id", tenant_of(&team)?)
            .verify()?;

        PlayerRepository::new(&txn).ensure_roster_space(team.id).await?;

        let player = PlayerActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: NotSet,
            team_id: Set(team.id),
            first_name: Set(first_name),
            last_name: Set(last_name),
            status: Set(PlayerStatus::Active.as_str().to_string()),
            suspended_until_matchday: Set(None),
            created_at: Set(Utc::now().into()),
        };

        let player = txn.insert::<Player>(player).await?;
        txn.commit().await?;
        Ok(player)
    }

    /// Puts an inactive player back on the active roster, within the roster
    /// limit. Suspended players stay suspended until the suspension is lifted.
    pub async fn activate_player(&self, id: Uuid) -> Result<PlayerModel, RepositoryError> {
        let txn = self.conn.begin().await?;
        let player = txn.lock_by_id::<Player>(id).await?;
        match player.status() {
            Some(PlayerStatus::Active) => return Ok(player),
            Some(PlayerStatus::Suspended) => {
                return Err(RepositoryError::invalid_field(
                    "status",
                    "A suspended player cannot be activated",
                ));
            }
            Some(PlayerStatus::Inactive) | None => {}
        }

        // Team lock orders this against registrations on the same roster.
        txn.lock_by_id::<Team>(player.team_id).await?;
        PlayerRepository::new(&txn)
            .ensure_roster_space(player.team_id)
            .await?;

        let mut player = player.into_active_model();
        player.status = Set(PlayerStatus::Active.as_str().to_string());
        let player = txn.update::<Player>(player).await?;
        txn.commit().await?;

        tracing::info!(player_id = %player.id, team_id = %player.team_id, "Activated player");
        Ok(player)
    }

    /// Takes a player off the active roster.
    pub async fn deactivate_player(&self, id: Uuid) -> Result<PlayerModel, RepositoryError> {
        let player = self.conn.find_by_id::<Player>(id).await?;
        match player.status() {
            Some(PlayerStatus::Inactive) => return Ok(player),
            Some(PlayerStatus::Suspended) => {
                return Err(RepositoryError::invalid_field(
                    "status",
                    "A suspended player cannot be deactivated",
                ));
            }
            Some(PlayerStatus::Active) | None => {}
        }

        let mut player = player.into_active_model();
        player.status = Set(PlayerStatus::Inactive.as_str().to_string());
        Ok(self.conn.update::<Player>(player).await?)
    }

    /// Suspends a player until the end of `until_matchday`.
    pub async fn suspend_player(
        &self,
        id: Uuid,
        until_matchday: i32,
    ) -> Result<PlayerModel, RepositoryError> {
        let player = self.conn.find_by_id::<Player>(id).await?;
        let until = player
            .suspended_until_matchday
            .filter(|_| player.status() == Some(PlayerStatus::Suspended))
            .map_or(until_matchday, |current| current.max(until_matchday));

        let mut player = player.into_active_model();
        player.status = Set(PlayerStatus::Suspended.as_str().to_string());
        player.suspended_until_matchday = Set(Some(until));
        Ok(self.conn.update::<Player>(player).await?)
    }

    /// Moves a player to another team of the same tenant. The player comes
    /// out of the transfer inactive.
    pub async fn transfer_player(
        &self,
        player_id: Uuid,
        new_team_id: Uuid,
    ) -> Result<PlayerModel, RepositoryError> {
        let player = self.conn.find_by_id::<Player>(player_id).await?;
        let team = self.conn.find_by_id::<Team>(new_team_id).await?;

        if player.team_id == team.id {
            return Err(RepositoryError::invalid_field(
                "team_id",
                "Player already belongs to this team",
            ));
        }

        TenantLinks::owned_by(tenant_of(&player)?)
            .link("team_id", tenant_of(&team)?)
            .verify()?;

        let from_team = player.team_id;
        let mut player = player.into_active_model();
        player.team_id = Set(team.id);
        player.status = Set(PlayerStatus::Inactive.as_str().to_string());
        player.suspended_until_matchday = Set(None);
        let player = self.conn.update::<Player>(player).await?;

        tracing::info!(
            player_id = %player.id,
            from_team = %from_team,
            to_team = %player.team_id,
            "Transferred player"
        );
        Ok(player)
    }

    /// Reactivates suspended players whose suspension ends before `matchday`.
    pub async fn lift_expired_suspensions(&self, matchday: i32) -> Result<u64, RepositoryError> {
        let lifted = self
            .conn
            .update_many(
                Player::update_many()
                    .col_expr(
                        PlayerColumn::Status,
                        Expr::value(PlayerStatus::Active.as_str()),
                    )
                    .col_expr(PlayerColumn::SuspendedUntilMatchday, Expr::value(None::<i32>))
                    .filter(PlayerColumn::Status.eq(PlayerStatus::Suspended.as_str()))
                    .filter(PlayerColumn::SuspendedUntilMatchday.lt(matchday)),
            )
            .await?;
        Ok(lifted)
    }

    async fn ensure_roster_space(&self, team_id: Uuid) -> Result<(), RepositoryError> {
        let limit = SeasonRepository::new(self.conn)
            .active_season()
            .await?
            .map(|season| season.max_active_players_per_team)
            .unwrap_or(DEFAULT_MAX_ACTIVE_PLAYERS);
        let active = self.count_active(team_id).await?;
        if active >= limit as u64 {
            return Err(RepositoryError::invalid_field(
                "team_id",
                format!("Team already has {active} active players (limit {limit})"),
            ));
        }
        Ok(())
    }

    async fn count_active(&self, team_id: Uuid) -> Result<u64, RepositoryError> {
        let count = self
            .conn
            .count(
                Player::find()
                    .filter(PlayerColumn::TeamId.eq(team_id))
                    .filter(PlayerColumn::Status.eq(PlayerStatus::Active.as_str())),
            )
            .await?;
        Ok(count)
    }
}

fn required_name(field: &'static str, raw: &str) -> Result<String, RepositoryError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(RepositoryError::invalid_field(field, "Name cannot be empty"));
    }
    Ok(name.to_string())
}
