use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::services::upload::UploadMetadata;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use conlearn_core::models::{
    CompleteUploadRequest, CompleteUploadResponse, PresignUploadRequest, PresignUploadResponse,
};
use std::sync::Arc;
use validator::Validate;

/// Issue a pre-signed URL for a direct upload to object storage
#[utoipa::path(
    post,
    path = "/api/files/presign",
    tag = "files",
    request_body = PresignUploadRequest,
    responses(
        (status = 200, description = "Upload URL issued", body = PresignUploadResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 500, description = "Storage not configured or signing failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(
        user_id = %request.user_id,
        file_type = %request.file_type,
        operation = "presign_upload"
    )
)]
pub async fn presign_upload(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<PresignUploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;

    let issued = state
        .uploads
        .issue_upload_url(&request.file_name, &request.file_type, &request.user_id)
        .await?;

    Ok(Json(PresignUploadResponse {
        upload_url: issued.url,
        key: issued.key,
        expires_at: issued.expires_at,
    }))
}

/// Record metadata for a file the client has uploaded
#[utoipa::path(
    post,
    path = "/api/files/complete",
    tag = "files",
    request_body = CompleteUploadRequest,
    responses(
        (status = 200, description = "Upload recorded", body = CompleteUploadResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 500, description = "Storage not configured or database failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %request.user_id, key = %request.key, operation = "complete_upload")
)]
pub async fn complete_upload(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CompleteUploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;

    let recorded = state
        .uploads
        .record_upload(UploadMetadata {
            user_id: request.user_id,
            file_name: request.file_name,
            file_type: request.file_type,
            file_size: request.file_size,
            key: request.key,
        })
        .await?;

    Ok(Json(CompleteUploadResponse {
        upload_id: recorded.record_id,
        s3_url: recorded.s3_url,
    }))
}
