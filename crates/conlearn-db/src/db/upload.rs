use async_trait::async_trait;
use chrono::Utc;
use conlearn_core::models::{NewUpload, UploadRecord};
use conlearn_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::repository::UploadRepository;

const UPLOAD_COLUMNS: &str = "id, user_id, file_name, file_size, file_type, storage_key, s3_url, uploaded_at, deleted_at";

/// PostgreSQL repository for upload records
#[derive(Clone)]
pub struct PgUploadRepository {
    pool: PgPool,
}

impl PgUploadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UploadRepository for PgUploadRepository {
    #[tracing::instrument(skip(self, upload), fields(user_id = %upload.user_id, key = %upload.storage_key))]
    async fn insert(&self, upload: NewUpload) -> Result<UploadRecord, AppError> {
        // Dynamic queries keep the build free of DATABASE_URL / sqlx prepare
        let record = sqlx::query_as::<_, UploadRecord>(&format!(
            r#"
            INSERT INTO uploads (
                id, user_id, file_name, file_size, file_type, storage_key, s3_url, uploaded_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            UPLOAD_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(upload.user_id)
        .bind(upload.file_name)
        .bind(upload.file_size)
        .bind(upload.file_type)
        .bind(upload.storage_key)
        .bind(upload.s3_url)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(upload_id = %record.id, "Upload record inserted");
        Ok(record)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<UploadRecord>, AppError> {
        let records = sqlx::query_as::<_, UploadRecord>(&format!(
            r#"
            SELECT {}
            FROM uploads
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY uploaded_at DESC, id DESC
            LIMIT $2
            "#,
            UPLOAD_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn soft_delete(
        &self,
        user_id: &str,
        upload_id: Uuid,
    ) -> Result<Option<UploadRecord>, AppError> {
        let record = sqlx::query_as::<_, UploadRecord>(&format!(
            r#"
            UPDATE uploads
            SET deleted_at = $3
            WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            RETURNING {}
            "#,
            UPLOAD_COLUMNS
        ))
        .bind(upload_id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
