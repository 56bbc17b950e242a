//! # Server Configuration
//!
//! Router assembly, shared state and the HTTP listener.
//!
//! Layer order, outermost first: CORS, HTTP tracing, trace context, tenant
//! boundary, panic catcher, routes. The tenant boundary wraps the panic
//! catcher so a panicking handler still leaves through the boundary's guard.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa::openapi::path::ParameterIn;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{AppConfig, DEFAULT_TENANT_HEADER};
use crate::handlers;
use crate::telemetry::trace_context_middleware;
use crate::tenancy::{ScopeEnforcer, ScopedConn, SessionPool, tenant_boundary};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub sessions: Arc<SessionPool>,
    pub enforcer: ScopeEnforcer,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Self {
        let sessions = Arc::new(SessionPool::new(db.clone(), config.session_pool_size));
        let enforcer = ScopeEnforcer::new(config.unscoped_policy);
        Self {
            config: Arc::new(config),
            db,
            sessions,
            enforcer,
        }
    }

    /// Checks out a pooled session for one handler invocation.
    pub fn scoped_conn(&self) -> ScopedConn {
        ScopedConn::new(self.sessions.checkout(), self.enforcer)
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/api/leagues/tenants",
            get(handlers::tenants::list_tenants).post(handlers::tenants::create_tenant),
        )
        .route(
            "/api/leagues/tenants/by-subdomain/{subdomain}",
            get(handlers::tenants::get_tenant_by_subdomain),
        )
        .route(
            "/api/leagues/teams",
            get(handlers::teams::list_teams).post(handlers::teams::create_team),
        )
        .route("/api/leagues/teams/{id}", get(handlers::teams::get_team))
        .route(
            "/api/leagues/seasons",
            get(handlers::seasons::list_seasons).post(handlers::seasons::create_season),
        )
        .route(
            "/api/leagues/seasons/{id}/activate",
            post(handlers::seasons::activate_season),
        )
        .route(
            "/api/leagues/seasons/{id}/advance-matchday",
            post(handlers::seasons::advance_matchday),
        )
        .route(
            "/api/registration/teams/{team_id}/players",
            get(handlers::players::list_team_players).post(handlers::players::register_player),
        )
        .route(
            "/api/registration/players/{id}/transfer",
            post(handlers::players::transfer_player),
        )
        .route(
            "/api/registration/players/{id}/activate",
            patch(handlers::players::activate_player),
        )
        .route(
            "/api/registration/players/{id}/deactivate",
            patch(handlers::players::deactivate_player),
        )
        .route(
            "/api/competition/matches",
            post(handlers::fixtures::schedule_match),
        )
        .route(
            "/api/competition/matches/{id}/result",
            post(handlers::fixtures::record_result),
        )
        .route(
            "/api/competition/matches/{id}/report",
            post(handlers::fixtures::submit_report),
        )
        .route(
            "/api/competition/matchdays/{matchday}/matches",
            get(handlers::fixtures::list_matchday_matches),
        )
        .route(
            "/api/competition/seasons/{season_id}/matches",
            get(handlers::fixtures::list_season_matches),
        )
        .route(
            "/api/competition/seasons/{season_id}/fixtures/generate",
            post(handlers::fixtures::generate_fixtures),
        )
        .route(
            "/api/tenants/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::for_config(&config)))
        .layer(CatchPanicLayer::new())
        .layer(middleware::from_fn_with_state(config, tenant_boundary))
        .layer(middleware::from_fn(trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    // Resolve the configured bind address
    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;
    let profile = config.profile.clone();

    let state = AppState::new(config, db);
    tracing::info!(
        sessions = state.sessions.size(),
        unscoped_policy = %state.enforcer.policy(),
        tenant_header = %state.config.tenant_header,
        "Tenant isolation configured"
    );
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::tenants::list_tenants,
        crate::handlers::tenants::create_tenant,
        crate::handlers::tenants::get_tenant_by_subdomain,
        crate::handlers::teams::list_teams,
        crate::handlers::teams::create_team,
        crate::handlers::teams::get_team,
        crate::handlers::seasons::list_seasons,
        crate::handlers::seasons::create_season,
        crate::handlers::seasons::activate_season,
        crate::handlers::seasons::advance_matchday,
        crate::handlers::players::list_team_players,
        crate::handlers::players::register_player,
        crate::handlers::players::transfer_player,
        crate::handlers::players::activate_player,
        crate::handlers::players::deactivate_player,
        crate::handlers::fixtures::schedule_match,
        crate::handlers::fixtures::list_season_matches,
        crate::handlers::fixtures::record_result,
        crate::handlers::fixtures::submit_report,
        crate::handlers::fixtures::list_matchday_matches,
        crate::handlers::fixtures::generate_fixtures,
        crate::handlers::settings::get_settings,
        crate::handlers::settings::update_settings,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::error::ApiError,
            crate::handlers::HealthStatus,
            crate::handlers::types::ResponseMeta,
            crate::handlers::types::TeamTarget,
            crate::handlers::tenants::CreateTenantRequestDto,
            crate::handlers::tenants::TenantDto,
            crate::handlers::teams::CreateTeamRequestDto,
            crate::handlers::teams::TeamDto,
            crate::handlers::seasons::CreateSeasonRequestDto,
            crate::handlers::seasons::SeasonDto,
            crate::handlers::players::RegisterPlayerRequestDto,
            crate::handlers::players::PlayerDto,
            crate::handlers::fixtures::ScheduleMatchRequestDto,
            crate::handlers::fixtures::MatchResultDto,
            crate::handlers::fixtures::MatchDto,
            crate::handlers::fixtures::MatchEventDto,
            crate::handlers::fixtures::MatchReportRequestDto,
            crate::handlers::fixtures::StoredMatchEventDto,
            crate::handlers::fixtures::MatchReportDto,
            crate::models::match_event::MatchEventType,
            crate::models::tenant_settings::SettingsValues,
        )
    ),
    tags(
        (name = "root", description = "Service information and health"),
        (name = "tenants", description = "League registry (tenant-agnostic)"),
        (name = "teams", description = "Teams of the active league"),
        (name = "seasons", description = "Season lifecycle"),
        (name = "registration", description = "Player registration, roster status and transfers"),
        (name = "competition", description = "Matches, reports and calendars"),
        (name = "settings", description = "Per-league settings"),
    ),
    info(
        title = "LeagueOS API",
        description = "Multi-tenant sports league management",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// The document with the tenant header parameter named as configured.
    pub fn for_config(config: &AppConfig) -> utoipa::openapi::OpenApi {
        let mut doc = Self::openapi();
        if config.tenant_header == DEFAULT_TENANT_HEADER {
            return doc;
        }

        for item in doc.paths.paths.values_mut() {
            let operations = [
                &mut item.get,
                &mut item.put,
                &mut item.post,
                &mut item.delete,
                &mut item.patch,
            ];
            for operation in operations.into_iter().flatten() {
                for parameter in operation.parameters.iter_mut().flatten() {
                    if matches!(parameter.parameter_in, ParameterIn::Header)
                        && parameter.name == DEFAULT_TENANT_HEADER
                    {
                        parameter.name = config.tenant_header.clone();
                    }
                }
            }
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_params(doc: &utoipa::openapi::OpenApi, path: &str) -> Vec<String> {
        doc.paths.paths[path]
            .get
            .as_ref()
            .and_then(|operation| operation.parameters.as_ref())
            .map(|parameters| {
                parameters
                    .iter()
                    .filter(|p| matches!(p.parameter_in, ParameterIn::Header))
                    .map(|p| p.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn openapi_documents_the_configured_tenant_header() {
        let default = ApiDoc::for_config(&AppConfig::default());
        assert_eq!(header_params(&default, "/api/leagues/teams"), vec!["X-Tenant-ID"]);

        let config = AppConfig {
            tenant_header: "X-League".to_string(),
            ..AppConfig::default()
        };
        let doc = ApiDoc::for_config(&config);
        assert_eq!(header_params(&doc, "/api/leagues/teams"), vec!["X-League"]);
        assert_eq!(
            header_params(&doc, "/api/competition/seasons/{season_id}/matches"),
            vec!["X-League"]
        );
    }
}
