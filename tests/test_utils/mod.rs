//! Test utilities for database testing.
//!
//! In-memory SQLite with every migration applied, plus helpers that seed
//! tenants and league data without going through the tenant filter.

#![allow(dead_code)]

use std::future::Future;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use leagueos::config::AppConfig;
use leagueos::models::{season, team, tenant};
use leagueos::server::AppState;
use leagueos::tenancy::{TenantId, with_tenant_boundary};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use uuid::Uuid;

/// Sets up an in-memory SQLite database with all migrations applied.
///
/// The pool is capped at one connection: every SQLite in-memory connection
/// is its own database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await?;

    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Application state over a fresh database with `sessions` pooled sessions.
pub async fn test_state(sessions: usize) -> Result<AppState> {
    let db = setup_test_db().await?;
    let config = AppConfig {
        profile: "test".to_string(),
        database_url: "sqlite::memory:".to_string(),
        session_pool_size: sessions,
        ..AppConfig::default()
    };
    Ok(AppState::new(config, db))
}

/// Registers a tenant row directly and returns its id.
pub async fn create_test_tenant(db: &DatabaseConnection, subdomain: &str) -> Result<TenantId> {
    let id = Uuid::new_v4();
    tenant::ActiveModel {
        id: Set(id),
        name: Set(format!("League {subdomain}")),
        sport_type: Set("soccer".to_string()),
        subdomain: Set(subdomain.to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;

    Ok(TenantId(id))
}

/// Inserts a team for `tenant` directly, bypassing the scoped connection.
pub async fn insert_team(db: &DatabaseConnection, tenant: TenantId, name: &str) -> Result<team::Model> {
    let team = team::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant.into_uuid()),
        name: Set(name.to_string()),
        logo_url: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;

    Ok(team)
}

/// Inserts an active season for `tenant` directly.
pub async fn insert_season(
    db: &DatabaseConnection,
    tenant: TenantId,
    name: &str,
) -> Result<season::Model> {
    let season = season::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant.into_uuid()),
        name: Set(name.to_string()),
        start_date: Set(date(2025, 3, 1)),
        end_date: Set(date(2025, 6, 30)),
        status: Set("active".to_string()),
        current_matchday: Set(1),
        max_active_players_per_team: Set(26),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;

    Ok(season)
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Runs `future` as one request of `tenant`.
pub async fn as_tenant<F>(tenant: TenantId, future: F) -> F::Output
where
    F: Future,
{
    with_tenant_boundary(Some(tenant), future).await
}

/// Runs `future` as one request that carries no tenant.
pub async fn without_tenant<F>(future: F) -> F::Output
where
    F: Future,
{
    with_tenant_boundary(None, future).await
}
