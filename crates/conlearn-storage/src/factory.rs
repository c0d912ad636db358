use crate::{S3Credentials, S3Storage, Storage, StorageError, StorageResult};
use conlearn_core::Config;
use std::sync::Arc;

/// Create the storage backend described by `config`.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let bucket = config
        .s3_bucket()
        .map(String::from)
        .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
    let region = config.s3_region().map(String::from).ok_or_else(|| {
        StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
    })?;
    let endpoint = config.s3_endpoint().map(String::from);

    let credentials = match (config.aws_access_key_id(), config.aws_secret_access_key()) {
        (Some(id), Some(secret)) => Some(S3Credentials {
            access_key_id: id.to_string(),
            secret_access_key: secret.to_string(),
        }),
        _ => None,
    };

    let storage = S3Storage::new(bucket, region, endpoint, credentials).await?;
    Ok(Arc::new(storage))
}
