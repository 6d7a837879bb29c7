//! Backend entry-point: loads settings, prepares the ledger store, and serves
//! the REST API with OpenAPI docs.

mod server;

use std::sync::Arc;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use splitledger::inbound::http::health::HealthState;
use splitledger::outbound::memory::InMemoryExpenseLedgerRepository;
use splitledger::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

use server::{AppSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| std::io::Error::other(err.to_string()))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let config = build_server_config(&settings, ServerConfig::new(bind_addr)).await?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "split ledger listening");
    server.await
}

async fn build_server_config(
    settings: &AppSettings,
    config: ServerConfig,
) -> std::io::Result<ServerConfig> {
    let Some(database_url) = settings.database_url() else {
        warn!("no database URL configured; using the in-memory ledger store");
        let repo = InMemoryExpenseLedgerRepository::new();
        if let Some(seed_file) = &settings.seed_file {
            repo.seed_from_file(seed_file)
                .await
                .map_err(std::io::Error::other)?;
        }
        return Ok(config.with_in_memory_ledger(Arc::new(repo)));
    };

    if settings.seed_file.is_some() {
        warn!("seed_file is only applied to the in-memory store; ignoring");
    }

    if settings.run_migrations() {
        let url = database_url.to_owned();
        let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
            .await
            .map_err(std::io::Error::other)?
            .map_err(std::io::Error::other)?;
        info!(applied, "database migrations up to date");
    }

    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.pool_max_size()))
        .await
        .map_err(std::io::Error::other)?;
    Ok(config.with_db_pool(pool))
}
