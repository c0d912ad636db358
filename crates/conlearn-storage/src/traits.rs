//! Storage abstraction trait

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Object storage as seen by the upload service.
///
/// The service never moves file bytes itself: clients PUT directly to the URL
/// returned by [`Storage::presigned_put_url`].
#[async_trait]
pub trait Storage: Send + Sync {
    /// Generate a pre-signed PUT URL for a direct upload to `storage_key`.
    ///
    /// The signature covers `content_type`: the upload must carry the same
    /// `Content-Type` header or storage rejects it.
    async fn presigned_put_url(
        &self,
        storage_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Public URL of the object stored under `storage_key`.
    fn public_url(&self, storage_key: &str) -> String;

    /// Check if an object exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Bucket the backend writes to
    fn bucket(&self) -> &str;
}
