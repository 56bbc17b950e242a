//! # Tenant Repository
//!
//! Tenants are the one tenant-agnostic collection. Every method here runs
//! through an explicit [`Exemption`] and is logged by the enforcer.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::tenant::{
    ActiveModel as TenantActiveModel, Column as TenantColumn, Entity as Tenant,
    Model as TenantModel,
};
use crate::tenancy::{Exemption, ScopedConn};

const DEFAULT_SPORT: &str = "soccer";
const MAX_SUBDOMAIN_LEN: usize = 63;

/// Request data for registering a new league
#[derive(Debug, Clone)]
pub struct CreateTenantRequest {
    pub name: String,
    /// Defaults to `soccer`
    pub sport_type: Option<String>,
    pub subdomain: String,
}

/// Repository for Tenant database operations
pub struct TenantRepository<'a> {
    conn: &'a ScopedConn,
}

impl<'a> TenantRepository<'a> {
    pub fn new(conn: &'a ScopedConn) -> Self {
        Self { conn }
    }

    /// List all tenants, ordered by name
    pub async fn list_tenants(&self) -> Result<Vec<TenantModel>, RepositoryError> {
        let exempt = self.conn.exempt(Exemption::ListTenants);
        let tenants = Tenant::find()
            .order_by_asc(TenantColumn::Name)
            .all(exempt.connection())
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(tenants)
    }

    /// Register a new tenant
    pub async fn create_tenant(
        &self,
        request: CreateTenantRequest,
    ) -> Result<TenantModel, RepositoryError> {
        let name = request.name.trim().to_string();
        validate_tenant_name(&name)?;
        let subdomain = normalize_subdomain(&request.subdomain)?;
        let sport_type = request
            .sport_type
            .map(|sport| sport.trim().to_ascii_lowercase())
            .filter(|sport| !sport.is_empty())
            .unwrap_or_else(|| DEFAULT_SPORT.to_string());

        let exempt = self.conn.exempt(Exemption::RegisterTenant);
        let tenant = TenantActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            sport_type: Set(sport_type),
            subdomain: Set(subdomain),
            created_at: Set(Utc::now().into()),
        };

        let result = tenant
            .insert(exempt.connection())
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(tenant_id = %result.id, subdomain = %result.subdomain, "Registered tenant");
        Ok(result)
    }

    /// Resolve a tenant from the subdomain it is served under
    pub async fn find_by_subdomain(
        &self,
        subdomain: &str,
    ) -> Result<Option<TenantModel>, RepositoryError> {
        let subdomain = subdomain.trim().to_ascii_lowercase();
        let exempt = self.conn.exempt(Exemption::ResolveTenantBySubdomain);
        let tenant = Tenant::find()
            .filter(TenantColumn::Subdomain.eq(subdomain))
            .one(exempt.connection())
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(tenant)
    }
}

fn validate_tenant_name(name: &str) -> Result<(), RepositoryError> {
    if name.is_empty() {
        return Err(RepositoryError::invalid_field(
            "name",
            "Tenant name cannot be empty",
        ));
    }

    if name.len() > 255 {
        return Err(RepositoryError::invalid_field(
            "name",
            "Tenant name cannot exceed 255 characters",
        ));
    }

    // Letters, numbers, spaces, hyphens, underscores, apostrophes and dots
    if !name.chars().all(|c| {
        c.is_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '_' | '\'' | '.')
    }) {
        return Err(RepositoryError::invalid_field(
            "name",
            "Tenant name contains unsupported characters",
        ));
    }

    Ok(())
}

/// Lowercases and checks a DNS label.
fn normalize_subdomain(raw: &str) -> Result<String, RepositoryError> {
    let subdomain = raw.trim().to_ascii_lowercase();

    let valid = !subdomain.is_empty()
        && subdomain.len() <= MAX_SUBDOMAIN_LEN
        && !subdomain.starts_with('-')
        && !subdomain.ends_with('-')
        && subdomain
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if !valid {
        return Err(RepositoryError::invalid_field(
            "subdomain",
            "Subdomain must be 1-63 lowercase letters, digits or inner hyphens",
        ));
    }
    Ok(subdomain)
}
