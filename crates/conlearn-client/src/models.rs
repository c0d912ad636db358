use chrono::{DateTime, Utc};
use conlearn_core::models::UploadRecord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An upload as the client sees it in a listing.
///
/// Only the name and URL are required; the rest may be missing from older
/// records and is rendered as "unknown" by the gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub file_name: String,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub storage_key: Option<String>,
    pub s3_url: String,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl From<UploadRecord> for UploadSummary {
    fn from(record: UploadRecord) -> Self {
        Self {
            id: Some(record.id),
            file_name: record.file_name,
            file_size: record.file_size,
            file_type: Some(record.file_type),
            storage_key: Some(record.storage_key),
            s3_url: record.s3_url,
            uploaded_at: Some(record.uploaded_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadList {
    #[serde(default)]
    pub uploads: Vec<UploadSummary>,
}
