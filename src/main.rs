//! # LeagueOS Main Entry Point
//!
//! `leagueos serve` (default) runs the API; `leagueos migrate` applies the
//! schema migrations and exits.

use anyhow::Context;
use clap::{Parser, Subcommand};
use leagueos::{
    config::ConfigLoader,
    db::init_pool,
    migration::{Migrator, MigratorTrait},
    server::run_server,
    telemetry::init_tracing,
};

#[derive(Parser)]
#[command(name = "leagueos", version, about = "Multi-tenant sports league API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, Default)]
enum Command {
    /// Run the HTTP API
    #[default]
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let config = ConfigLoader::new()
        .load()
        .context("Failed to load configuration")?;
    init_tracing(&config)?;

    if let Ok(redacted_json) = config.redacted_json() {
        tracing::info!(profile = %config.profile, config = %redacted_json, "Loaded configuration");
    }

    let db = init_pool(&config).await?;

    match cli.command.unwrap_or_default() {
        Command::Migrate => {
            Migrator::up(&db, None)
                .await
                .context("Failed to apply migrations")?;
            tracing::info!("Migrations applied");
            Ok(())
        }
        Command::Serve => {
            if config.run_migrations {
                Migrator::up(&db, None)
                    .await
                    .context("Failed to apply migrations")?;
            }
            run_server(config, db)
                .await
                .map_err(|err| anyhow::anyhow!(err.to_string()))
        }
    }
}
