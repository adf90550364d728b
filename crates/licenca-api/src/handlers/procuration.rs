use crate::auth::models::Identity;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::ServiceState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use licenca_core::models::{ProcessCollaborator, StoredFileMetadata};
use uuid::Uuid;

/// Overwrite a collaborator's procuration file record
///
/// Sending empty strings and zeroed metadata clears it.
#[utoipa::path(
    put,
    path = "/api/v0/collaborators/{id}/procuration",
    tag = "collaborators",
    params(("id" = Uuid, Path, description = "Collaborator ID")),
    request_body = StoredFileMetadata,
    responses(
        (status = 200, description = "Updated collaborator", body = ProcessCollaborator),
        (status = 400, description = "Storage path outside the process", body = ErrorResponse),
        (status = 403, description = "Caller does not own the process", body = ErrorResponse),
        (status = 404, description = "Collaborator not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(services, stored),
    fields(user_id = %identity.user_id, collaborator_id = %id, cleared = stored.is_cleared())
)]
pub async fn set_procuration(
    identity: Identity,
    Path(id): Path<Uuid>,
    State(services): State<ServiceState>,
    ValidatedJson(stored): ValidatedJson<StoredFileMetadata>,
) -> Result<impl IntoResponse, HttpAppError> {
    let collaborator = services
        .attachments
        .set_procuration(&identity, id, stored)
        .await?;
    Ok(Json(collaborator))
}
