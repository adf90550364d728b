//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use licenca_core::models;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Licenca API",
        version = "0.1.0",
        description = "Environmental license process management. Issues signed upload and download URLs for process documents and collaborator procurations. All endpoints are versioned under /api/v0/."
    ),
    modifiers(&BearerAuth),
    paths(
        // Uploads
        handlers::signed_upload::create_signed_upload_url,
        // Files
        handlers::files::create_download_url,
        handlers::files::delete_file,
        // Processes
        handlers::processes::list_processes,
        handlers::processes::create_process,
        handlers::processes::process_stats,
        handlers::processes::get_process,
        handlers::processes::update_process,
        handlers::processes::delete_process,
        // Documents
        handlers::documents::list_documents,
        handlers::documents::record_document,
        handlers::documents::remove_document,
        // Collaborators
        handlers::procuration::set_procuration,
        // Health
        crate::setup::routes::health::health_check,
    ),
    components(
        schemas(
            models::SignedUploadUrlRequest,
            models::WriteCredential,
            models::DownloadUrlRequest,
            models::DownloadUrlResponse,
            models::DeleteFileRequest,
            models::FileMetadata,
            models::StoredFileMetadata,
            models::LicenseProcess,
            models::LicenseType,
            models::ProcessStatus,
            models::EnvironmentalImpact,
            models::ProcessWithCompany,
            models::NewProcessInput,
            models::ProcessUpdate,
            models::ProcessStats,
            models::Company,
            models::ProcessCollaborator,
            models::CollaboratorStatus,
            models::PermissionLevel,
            models::ProcessDocument,
            models::RecordDocumentRequest,
            crate::setup::routes::health::HealthResponse,
            crate::setup::routes::health::HealthCheck,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "uploads", description = "Signed upload URL issuance"),
        (name = "files", description = "Signed download URLs and file removal"),
        (name = "processes", description = "License process management"),
        (name = "documents", description = "Documents recorded on a process"),
        (name = "collaborators", description = "Collaborator procuration records"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
