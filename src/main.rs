//! task-market server entry point.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use std::sync::Arc;
use task_market::api::{self, AppState};
use task_market::cli::{Cli, Command};
use task_market::config::{Config, ConfigLoader, ConfigPaths};
use task_market::db::Database;
use task_market::logging::{self, LogTarget};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut paths = ConfigPaths::discover();
    if let Some(config_path) = &cli.config {
        paths = paths.with_explicit(config_path);
    }
    let loader = ConfigLoader::load_with_paths(paths)?;
    for source in loader.sources() {
        info!("Config: {}", source.display());
    }
    let mut config = loader.into_config();
    cli.apply_overrides(&mut config);

    match cli.command() {
        Command::Migrate => {
            Database::open(&config.server.db_path)?;
            info!("Database migrated: {:?}", config.server.db_path);
        }
        Command::Serve => run_server(config).await?,
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    if config.auth.jwt_secret.is_empty() {
        bail!("auth.jwt_secret is not set; configure it or set TASK_MARKET_JWT_SECRET");
    }
    let addr = tokio::net::lookup_host(config.bind_addr())
        .await?
        .next()
        .ok_or_else(|| anyhow!("Cannot resolve {}", config.bind_addr()))?;

    info!("Starting task-market v{}", env!("CARGO_PKG_VERSION"));
    info!("Database: {:?}", config.server.db_path);

    let db = Arc::new(Database::open(&config.server.db_path)?);
    let state = AppState::from_config(db, &config)?;

    let (shutdown_tx, bound, handle) =
        api::start_server(state, addr, config.server.cors_permissive).await?;
    info!("Ready on http://{}", bound);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    let _ = shutdown_tx.send(());
    handle.await?;

    Ok(())
}
