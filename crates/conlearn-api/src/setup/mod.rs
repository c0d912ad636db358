//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use conlearn_core::Config;
use conlearn_db::PgUploadRepository;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.environment());

    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;
    tracing::info!("Configuration loaded and validated successfully");

    let pool = setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;

    let repository = Arc::new(PgUploadRepository::new(pool));
    let state = Arc::new(AppState::new(
        Some(storage),
        repository,
        config.presign_expiry(),
    ));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

/// Connect to PostgreSQL and bring the schema up to date.
async fn setup_database(config: &Config) -> Result<PgPool> {
    tracing::info!("Connecting to database...");
    let pool = conlearn_db::connect(
        config.database_url(),
        config.db_max_connections(),
        Duration::from_secs(config.db_timeout_seconds()),
    )
    .await
    .context("Failed to connect to database")?;

    conlearn_db::migrate(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Database connected and migrated"
    );
    Ok(pool)
}
