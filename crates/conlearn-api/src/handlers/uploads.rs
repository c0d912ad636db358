use crate::error::{ErrorResponse, HttpAppError, ValidatedPath, ValidatedQuery};
use crate::state::AppState;
use axum::{
    extract::State,
    response::IntoResponse,
    Json,
};
use conlearn_core::models::{DeleteUploadQuery, DeleteUploadResponse, UploadListResponse};
use conlearn_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// List a user's uploads, newest first (at most 50)
#[utoipa::path(
    get,
    path = "/api/files/user/{user_id}",
    tag = "files",
    params(
        ("user_id" = String, Path, description = "Identity-provider user id")
    ),
    responses(
        (status = 200, description = "Uploads for the user", body = UploadListResponse),
        (status = 500, description = "Database failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_uploads"))]
pub async fn list_user_uploads(
    State(state): State<Arc<AppState>>,
    ValidatedPath(user_id): ValidatedPath<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let uploads = state.uploads.list_uploads(&user_id).await?;
    Ok(Json(UploadListResponse { uploads }))
}

/// Soft-delete one of a user's uploads
#[utoipa::path(
    delete,
    path = "/api/files/{upload_id}",
    tag = "files",
    params(
        ("upload_id" = Uuid, Path, description = "Upload record id"),
        DeleteUploadQuery
    ),
    responses(
        (status = 200, description = "Upload deleted", body = DeleteUploadResponse),
        (status = 400, description = "userId missing or malformed upload id", body = ErrorResponse),
        (status = 404, description = "No live upload with that id for the user", body = ErrorResponse),
        (status = 500, description = "Database failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(operation = "delete_upload"))]
pub async fn delete_upload(
    State(state): State<Arc<AppState>>,
    ValidatedPath(upload_id): ValidatedPath<Uuid>,
    ValidatedQuery(query): ValidatedQuery<DeleteUploadQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let user_id = query
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("userId query parameter is required".to_string()))?;

    let deleted = state
        .uploads
        .delete_upload(&user_id, upload_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Upload {} not found", upload_id)))?;

    let deleted_at = deleted.deleted_at.ok_or_else(|| {
        AppError::Internal(format!("Upload {} was deleted without a timestamp", upload_id))
    })?;

    Ok(Json(DeleteUploadResponse {
        upload_id: deleted.id,
        deleted_at,
    }))
}
