//! # Team Repository

use chrono::Utc;
use sea_orm::{ActiveValue::NotSet, EntityTrait, IntoActiveModel, QueryOrder, Set};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::team::{
    ActiveModel as TeamActiveModel, Column as TeamColumn, Entity as Team, Model as TeamModel,
};
use crate::tenancy::ScopedConn;

const MAX_TEAM_NAME_LEN: usize = 100;

#[derive(Debug, Clone)]
pub struct CreateTeamRequest {
    pub name: String,
    pub logo_url: Option<String>,
}

/// Repository for the active tenant's teams
pub struct TeamRepository<'a> {
    conn: &'a ScopedConn,
}

impl<'a> TeamRepository<'a> {
    pub fn new(conn: &'a ScopedConn) -> Self {
        Self { conn }
    }

    pub async fn list_teams(&self) -> Result<Vec<TeamModel>, RepositoryError> {
        let teams = self
            .conn
            .find_all(Team::find().order_by_asc(TeamColumn::Name))
            .await?;
        Ok(teams)
    }

    pub async fn create_team(
        &self,
        request: CreateTeamRequest,
    ) -> Result<TeamModel, RepositoryError> {
        let name = validate_team_name(&request.name)?;
        let logo_url = request
            .logo_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let team = TeamActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: NotSet,
            name: Set(name),
            logo_url: Set(logo_url),
            created_at: Set(Utc::now().into()),
        };

        Ok(self.conn.insert::<Team>(team).await?)
    }

    /// Teams of other tenants are reported as not found
    pub async fn get_team(&self, id: Uuid) -> Result<TeamModel, RepositoryError> {
        Ok(self.conn.find_by_id::<Team>(id).await?)
    }

    pub async fn rename_team(&self, id: Uuid, name: &str) -> Result<TeamModel, RepositoryError> {
        let name = validate_team_name(name)?;
        let mut team = self.get_team(id).await?.into_active_model();
        team.name = Set(name);
        Ok(self.conn.update::<Team>(team).await?)
    }

    pub async fn delete_team(&self, id: Uuid) -> Result<(), RepositoryError> {
        Ok(self.conn.delete_by_id::<Team>(id).await?)
    }
}

fn validate_team_name(raw: &str) -> Result<String, RepositoryError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(RepositoryError::invalid_field(
            "name",
            "Team name cannot be empty",
        ));
    }
    if name.chars().count() > MAX_TEAM_NAME_LEN {
        return Err(RepositoryError::invalid_field(
            "name",
            "Team name cannot exceed 100 characters",
        ));
    }
    Ok(name.to_string())
}
