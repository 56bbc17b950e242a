//! # Tests for Handlers
//!
//! Handler calls without the HTTP stack: no router, no tenant boundary.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::handlers::{health, root, teams};
use crate::server::AppState;
use crate::tenancy::{RequireTenant, TenantId};

fn disconnected_state() -> AppState {
    AppState::new(AppConfig::default(), DatabaseConnection::default())
}

#[tokio::test]
async fn test_root_handler_returns_service_info() {
    let info = root().await.0;
    assert_eq!(info.service, "leagueos");
    assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_health_reports_unavailable_database() {
    let error = health(State(disconnected_state()))
        .await
        .expect_err("disconnected database must fail the health check");

    assert_eq!(error.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error.retry_after, Some(5));
}

#[tokio::test]
async fn test_scoped_handler_without_context_fails_closed() {
    // The extractor value alone does not scope the data layer; only the
    // execution context does.
    let tenant = TenantId(Uuid::new_v4());
    let result = teams::list_teams(State(disconnected_state()), RequireTenant(tenant)).await;

    let error = match result {
        Ok(_) => panic!("unscoped read must be rejected"),
        Err(error) => error,
    };
    assert_eq!(error.status, StatusCode::BAD_REQUEST);
    assert_eq!(&*error.code, "TENANT_REQUIRED");

    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
