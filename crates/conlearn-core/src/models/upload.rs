use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Metadata for one file a user uploaded to object storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    pub id: Uuid,
    /// Identity-provider subject id of the owner
    pub user_id: String,
    pub file_name: String,
    /// Size in bytes as reported by the client
    #[serde(default)]
    pub file_size: Option<i64>,
    pub file_type: String,
    /// Object path inside the bucket
    pub storage_key: String,
    /// Public URL of the stored object
    pub s3_url: String,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Fields needed to insert a new [`UploadRecord`].
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub user_id: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: Option<i64>,
    pub storage_key: String,
    pub s3_url: String,
}

/// Request for a pre-signed upload URL
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PresignUploadRequest {
    /// Original file name; its extension becomes the key's extension
    #[serde(default)]
    #[validate(length(min = 1, message = "fileName is required"))]
    pub file_name: String,
    /// MIME type the client will upload
    #[serde(default)]
    #[validate(length(min = 1, message = "fileType is required"))]
    pub file_type: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    /// Optional size hint in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "fileSize must be a non-negative number"))]
    pub file_size: Option<i64>,
}

/// Pre-signed upload URL and the storage key it targets
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresignUploadResponse {
    /// URL accepting a single PUT of the file body
    pub upload_url: String,
    /// Storage key to pass back when completing the upload
    pub key: String,
    pub expires_at: DateTime<Utc>,
}

/// Request to record a finished upload
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompleteUploadRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "fileName is required"))]
    pub file_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "fileType is required"))]
    pub file_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "fileSize must be a non-negative number"))]
    pub file_size: Option<i64>,
    /// Storage key returned by the presign call
    #[serde(default)]
    #[validate(length(min = 1, message = "key is required"))]
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteUploadResponse {
    pub upload_id: Uuid,
    pub s3_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadListResponse {
    pub uploads: Vec<UploadRecord>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DeleteUploadQuery {
    /// Owner of the upload
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUploadResponse {
    pub upload_id: Uuid,
    pub deleted_at: DateTime<Utc>,
}
