use crate::auth::models::BearerToken;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::ServiceState;
use axum::{body::Bytes, extract::State, response::IntoResponse, Json};
use licenca_core::models::{SignedUploadUrlRequest, WriteCredential};

/// Issue a signed URL for uploading one file under a license process
///
/// The body is parsed leniently: a missing or malformed body reads as a
/// request with every field absent, so the caller's identity is always
/// checked before the body's completeness.
#[utoipa::path(
    post,
    path = "/api/v0/uploads/signed-url",
    tag = "uploads",
    request_body = SignedUploadUrlRequest,
    responses(
        (status = 200, description = "Signed upload URL issued", body = WriteCredential),
        (status = 400, description = "Missing fields or disallowed content type", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the process", body = ErrorResponse),
        (status = 404, description = "Process not found", body = ErrorResponse),
        (status = 500, description = "Storage provider failed to sign", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(services, token, body),
    fields(operation = "issue_write_credential", body_bytes = body.len())
)]
pub async fn create_signed_upload_url(
    State(services): State<ServiceState>,
    token: BearerToken,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let request: SignedUploadUrlRequest = serde_json::from_slice(&body).unwrap_or_default();

    let credential = services
        .broker
        .issue_write_credential(token.0.as_deref(), request)
        .await?;

    Ok(Json(credential))
}
