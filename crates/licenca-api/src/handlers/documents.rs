use crate::auth::models::Identity;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::ServiceState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use licenca_core::models::{ProcessDocument, RecordDocumentRequest};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DocumentPathQuery {
    /// Storage path of the document to clear
    pub path: String,
}

#[utoipa::path(
    get,
    path = "/api/v0/processes/{id}/documents",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Process ID")),
    responses(
        (status = 200, description = "Documents of the process", body = Vec<ProcessDocument>),
        (status = 403, description = "No access to the process", body = ErrorResponse),
        (status = 404, description = "Process not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(services), fields(user_id = %identity.user_id, process_id = %id))]
pub async fn list_documents(
    identity: Identity,
    Path(id): Path<Uuid>,
    State(services): State<ServiceState>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(services.attachments.list_documents(&identity, id).await?))
}

/// Record an uploaded file as a document of the process
#[utoipa::path(
    post,
    path = "/api/v0/processes/{id}/documents",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Process ID")),
    request_body = RecordDocumentRequest,
    responses(
        (status = 201, description = "Document recorded", body = ProcessDocument),
        (status = 400, description = "Storage path outside the process", body = ErrorResponse),
        (status = 403, description = "Caller does not own the process", body = ErrorResponse),
        (status = 404, description = "Process not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(services, request),
    fields(user_id = %identity.user_id, process_id = %id, storage_path = %request.storage_path)
)]
pub async fn record_document(
    identity: Identity,
    Path(id): Path<Uuid>,
    State(services): State<ServiceState>,
    ValidatedJson(request): ValidatedJson<RecordDocumentRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = services
        .attachments
        .record_document(&identity, id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

#[utoipa::path(
    delete,
    path = "/api/v0/processes/{id}/documents",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Process ID"), DocumentPathQuery),
    responses(
        (status = 204, description = "Document record cleared"),
        (status = 403, description = "Caller does not own the process", body = ErrorResponse),
        (status = 404, description = "Process not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(services, query),
    fields(user_id = %identity.user_id, process_id = %id, storage_path = %query.path)
)]
pub async fn remove_document(
    identity: Identity,
    Path(id): Path<Uuid>,
    State(services): State<ServiceState>,
    Query(query): Query<DocumentPathQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    services
        .attachments
        .remove_document(&identity, id, &query.path)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
