use crate::auth::models::Identity;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::ServiceState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use licenca_core::models::{
    LicenseProcess, NewProcessInput, ProcessFilters, ProcessStats, ProcessUpdate,
    ProcessWithCompany,
};
use uuid::Uuid;

/// List the caller's processes, owned and shared
#[utoipa::path(
    get,
    path = "/api/v0/processes",
    tag = "processes",
    params(ProcessFilters),
    responses(
        (status = 200, description = "Processes, newest first", body = Vec<ProcessWithCompany>),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(services, filters), fields(user_id = %identity.user_id))]
pub async fn list_processes(
    identity: Identity,
    State(services): State<ServiceState>,
    Query(filters): Query<ProcessFilters>,
) -> Result<impl IntoResponse, HttpAppError> {
    let processes = services.processes.list(&identity, &filters).await?;
    Ok(Json(processes))
}

/// Submit a new license process
#[utoipa::path(
    post,
    path = "/api/v0/processes",
    tag = "processes",
    request_body = NewProcessInput,
    responses(
        (status = 201, description = "Process created", body = ProcessWithCompany),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(services, input), fields(user_id = %identity.user_id))]
pub async fn create_process(
    identity: Identity,
    State(services): State<ServiceState>,
    ValidatedJson(input): ValidatedJson<NewProcessInput>,
) -> Result<impl IntoResponse, HttpAppError> {
    let created = services.processes.create(&identity, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v0/processes/stats",
    tag = "processes",
    responses(
        (status = 200, description = "Counts by status over owned processes", body = ProcessStats)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(services), fields(user_id = %identity.user_id))]
pub async fn process_stats(
    identity: Identity,
    State(services): State<ServiceState>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(services.processes.stats(&identity).await?))
}

#[utoipa::path(
    get,
    path = "/api/v0/processes/{id}",
    tag = "processes",
    params(("id" = Uuid, Path, description = "Process ID")),
    responses(
        (status = 200, description = "Process with its company", body = ProcessWithCompany),
        (status = 404, description = "Process not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(services), fields(user_id = %identity.user_id, process_id = %id))]
pub async fn get_process(
    identity: Identity,
    Path(id): Path<Uuid>,
    State(services): State<ServiceState>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(services.processes.get(&identity, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v0/processes/{id}",
    tag = "processes",
    params(("id" = Uuid, Path, description = "Process ID")),
    request_body = ProcessUpdate,
    responses(
        (status = 200, description = "Updated process", body = LicenseProcess),
        (status = 400, description = "Invalid or empty update", body = ErrorResponse),
        (status = 403, description = "Caller does not own the process", body = ErrorResponse),
        (status = 404, description = "Process not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(services, update), fields(user_id = %identity.user_id, process_id = %id))]
pub async fn update_process(
    identity: Identity,
    Path(id): Path<Uuid>,
    State(services): State<ServiceState>,
    ValidatedJson(update): ValidatedJson<ProcessUpdate>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(services.processes.update(&identity, id, update).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v0/processes/{id}",
    tag = "processes",
    params(("id" = Uuid, Path, description = "Process ID")),
    responses(
        (status = 204, description = "Process deleted"),
        (status = 403, description = "Caller does not own the process", body = ErrorResponse),
        (status = 404, description = "Process not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(services), fields(user_id = %identity.user_id, process_id = %id))]
pub async fn delete_process(
    identity: Identity,
    Path(id): Path<Uuid>,
    State(services): State<ServiceState>,
) -> Result<impl IntoResponse, HttpAppError> {
    services.processes.delete(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
