//! Repository trait for upload metadata
//!
//! Keeps the service layer independent of PostgreSQL so it can be exercised
//! against in-memory implementations.

use async_trait::async_trait;
use conlearn_core::models::{NewUpload, UploadRecord};
use conlearn_core::AppError;
use uuid::Uuid;

#[async_trait]
pub trait UploadRepository: Send + Sync {
    /// Insert a new record with a fresh id and `uploaded_at = now`.
    async fn insert(&self, upload: NewUpload) -> Result<UploadRecord, AppError>;

    /// Live (not soft-deleted) records owned by `user_id`, newest first.
    ///
    /// Ties on `uploaded_at` are ordered by id descending. At most `limit`
    /// records are returned.
    async fn list_for_user(&self, user_id: &str, limit: i64)
        -> Result<Vec<UploadRecord>, AppError>;

    /// Mark a live record as deleted.
    ///
    /// Returns `None` when `user_id` owns no live record with that id.
    async fn soft_delete(
        &self,
        user_id: &str,
        upload_id: Uuid,
    ) -> Result<Option<UploadRecord>, AppError>;

    /// Round-trip to the store, used by readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
}
