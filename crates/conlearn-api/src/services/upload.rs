//! Upload URL issuing, metadata recording and listing.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use conlearn_core::constants::MAX_UPLOADS_PER_LIST;
use conlearn_core::models::{NewUpload, UploadRecord};
use conlearn_core::AppError;
use conlearn_db::UploadRepository;
use conlearn_storage::{generate_upload_key, Storage, StorageError};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("{0}")]
    Invalid(String),

    #[error("object storage is not configured")]
    MissingConfiguration,

    #[error("failed to sign upload URL: {0}")]
    Signing(#[source] StorageError),
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("{0}")]
    Invalid(String),

    #[error("object storage is not configured")]
    MissingConfiguration,

    #[error("failed to persist upload record: {0}")]
    Persistence(#[source] AppError),
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("{0}")]
    Invalid(String),

    #[error("failed to query upload records: {0}")]
    Persistence(#[source] AppError),
}

/// A signed upload URL together with the key it targets.
#[derive(Debug, Clone)]
pub struct IssuedUpload {
    pub url: String,
    pub key: String,
    pub expires_at: DateTime<Utc>,
}

/// Fields the client reports once its PUT succeeded.
#[derive(Debug, Clone)]
pub struct UploadMetadata {
    pub user_id: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: Option<i64>,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub record_id: Uuid,
    pub s3_url: String,
}

/// Presence check shared by every operation: names the empty fields.
fn require_fields(fields: &[(&str, &str)]) -> Result<(), String> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("Missing required fields: {}", missing.join(", ")))
    }
}

#[derive(Clone)]
pub struct UploadService {
    storage: Option<Arc<dyn Storage>>,
    repository: Arc<dyn UploadRepository>,
    presign_expiry: Duration,
}

impl UploadService {
    pub fn new(
        storage: Option<Arc<dyn Storage>>,
        repository: Arc<dyn UploadRepository>,
        presign_expiry: Duration,
    ) -> Self {
        Self {
            storage,
            repository,
            presign_expiry,
        }
    }

    /// Mint a short-lived PUT URL for a new object in `user_id`'s namespace.
    ///
    /// Performs no storage or database I/O; the object does not exist until
    /// the client uploads to the returned URL.
    #[tracing::instrument(skip(self), fields(operation = "issue_upload_url"))]
    pub async fn issue_upload_url(
        &self,
        file_name: &str,
        file_type: &str,
        user_id: &str,
    ) -> Result<IssuedUpload, IssueError> {
        require_fields(&[
            ("fileName", file_name),
            ("fileType", file_type),
            ("userId", user_id),
        ])
        .map_err(IssueError::Invalid)?;

        let storage = self
            .storage
            .as_ref()
            .ok_or(IssueError::MissingConfiguration)?;

        let key = generate_upload_key(user_id, file_name)
            .map_err(|e| IssueError::Invalid(e.to_string()))?;

        let expires_at = Utc::now() + chrono::Duration::seconds(self.presign_expiry.as_secs() as i64);
        let url = storage
            .presigned_put_url(&key, file_type, self.presign_expiry)
            .await
            .map_err(IssueError::Signing)?;

        tracing::info!(
            user_id = %user_id,
            key = %key,
            expires_at = %expires_at,
            "Issued upload URL"
        );

        Ok(IssuedUpload {
            url,
            key,
            expires_at,
        })
    }

    /// Persist metadata for an object the client has uploaded.
    ///
    /// The object's existence is not verified, and recording the same key
    /// twice yields two records.
    #[tracing::instrument(
        skip(self, metadata),
        fields(user_id = %metadata.user_id, key = %metadata.key, operation = "record_upload")
    )]
    pub async fn record_upload(
        &self,
        metadata: UploadMetadata,
    ) -> Result<RecordedUpload, RecordError> {
        require_fields(&[
            ("userId", &metadata.user_id),
            ("fileName", &metadata.file_name),
            ("fileType", &metadata.file_type),
            ("key", &metadata.key),
        ])
        .map_err(RecordError::Invalid)?;

        if matches!(metadata.file_size, Some(size) if size < 0) {
            return Err(RecordError::Invalid(
                "fileSize must be a non-negative number".to_string(),
            ));
        }

        let storage = self
            .storage
            .as_ref()
            .ok_or(RecordError::MissingConfiguration)?;
        let s3_url = storage.public_url(&metadata.key);

        let record = self
            .repository
            .insert(NewUpload {
                user_id: metadata.user_id,
                file_name: metadata.file_name,
                file_type: metadata.file_type,
                file_size: metadata.file_size,
                storage_key: metadata.key,
                s3_url,
            })
            .await
            .map_err(RecordError::Persistence)?;

        tracing::info!(upload_id = %record.id, "Upload recorded");

        Ok(RecordedUpload {
            record_id: record.id,
            s3_url: record.s3_url,
        })
    }

    /// The user's live uploads, newest first, capped at the list limit.
    pub async fn list_uploads(&self, user_id: &str) -> Result<Vec<UploadRecord>, QueryError> {
        require_fields(&[("userId", user_id)]).map_err(QueryError::Invalid)?;

        let records = self
            .repository
            .list_for_user(user_id, MAX_UPLOADS_PER_LIST)
            .await
            .map_err(QueryError::Persistence)?;

        tracing::debug!(user_id = %user_id, count = records.len(), "Listed uploads");
        Ok(records)
    }

    /// Soft-delete one of the user's uploads. `None` when there is no live
    /// record with that id for the user.
    pub async fn delete_upload(
        &self,
        user_id: &str,
        upload_id: Uuid,
    ) -> Result<Option<UploadRecord>, QueryError> {
        require_fields(&[("userId", user_id)]).map_err(QueryError::Invalid)?;

        let deleted = self
            .repository
            .soft_delete(user_id, upload_id)
            .await
            .map_err(QueryError::Persistence)?;

        if deleted.is_some() {
            tracing::info!(user_id = %user_id, upload_id = %upload_id, "Upload soft-deleted");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_fields_names_every_empty_field() {
        let err = require_fields(&[("fileName", ""), ("fileType", "image/png"), ("userId", "  ")])
            .unwrap_err();
        assert_eq!(err, "Missing required fields: fileName, userId");
        assert!(require_fields(&[("key", "u1/uploads/a.png")]).is_ok());
    }
}
