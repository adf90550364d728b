use crate::auth::models::Identity;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::ServiceState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use licenca_core::models::{DeleteFileRequest, DownloadUrlRequest, DownloadUrlResponse};

/// Create a time-limited read URL for a stored file
#[utoipa::path(
    post,
    path = "/api/v0/files/download-url",
    tag = "files",
    request_body = DownloadUrlRequest,
    responses(
        (status = 200, description = "Signed download URL", body = DownloadUrlResponse),
        (status = 400, description = "Invalid storage path", body = ErrorResponse),
        (status = 403, description = "No access to the owning process", body = ErrorResponse),
        (status = 404, description = "Owning process not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(services, request),
    fields(user_id = %identity.user_id, storage_path = %request.storage_path, operation = "download_url")
)]
pub async fn create_download_url(
    identity: Identity,
    State(services): State<ServiceState>,
    ValidatedJson(request): ValidatedJson<DownloadUrlRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = services
        .files
        .download_url(&identity, &request.storage_path)
        .await?;
    Ok(Json(response))
}

/// Remove a stored file
#[utoipa::path(
    delete,
    path = "/api/v0/files",
    tag = "files",
    request_body = DeleteFileRequest,
    responses(
        (status = 204, description = "File removed (or already absent)"),
        (status = 400, description = "Invalid storage path", body = ErrorResponse),
        (status = 403, description = "Caller does not own the process", body = ErrorResponse),
        (status = 500, description = "Storage provider failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(services, request),
    fields(user_id = %identity.user_id, storage_path = %request.storage_path, operation = "delete_file")
)]
pub async fn delete_file(
    identity: Identity,
    State(services): State<ServiceState>,
    ValidatedJson(request): ValidatedJson<DeleteFileRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    services.files.delete(&identity, &request.storage_path).await?;
    Ok(StatusCode::NO_CONTENT)
}
