//! Storage setup

use anyhow::{Context, Result};
use conlearn_core::Config;
use conlearn_storage::Storage;
use std::sync::Arc;

/// Build the object storage backend from configuration.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = conlearn_storage::create_storage(config)
        .await
        .context("Failed to initialize object storage")?;

    tracing::info!(
        bucket = %storage.bucket(),
        region = config.s3_region().unwrap_or_default(),
        endpoint = config.s3_endpoint().unwrap_or("aws"),
        presign_expiry_secs = config.presign_expiry().as_secs(),
        "Object storage configured"
    );

    Ok(storage)
}
