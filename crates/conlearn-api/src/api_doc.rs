//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use conlearn_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ConLearn API",
        version = "0.1.0",
        description = "Issues pre-signed upload URLs, records upload metadata and lists a user's uploads."
    ),
    paths(
        handlers::presigned_upload::presign_upload,
        handlers::presigned_upload::complete_upload,
        handlers::uploads::list_user_uploads,
        handlers::uploads::delete_upload,
    ),
    components(schemas(
        models::UploadRecord,
        models::PresignUploadRequest,
        models::PresignUploadResponse,
        models::CompleteUploadRequest,
        models::CompleteUploadResponse,
        models::UploadListResponse,
        models::DeleteUploadResponse,
        error::ErrorResponse,
    )),
    tags(
        (name = "files", description = "Direct-to-storage uploads and their metadata")
    )
)]
pub struct ApiDoc;
