//! Service initialization and application state setup

use crate::auth::{AuthState, IdentityProvider};
use crate::services::{AccessBroker, AttachmentService, FileService, ProcessService};
use crate::state::{AppState, DbState, ServiceState, StorageState, Stores};
use licenca_core::{Config, FileValidator};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Wire stores, storage and identity verification into the application state
pub fn initialize_services(
    config: &Config,
    pool: Option<PgPool>,
    stores: Stores,
    storage: StorageState,
    identity: Arc<dyn IdentityProvider>,
) -> Arc<AppState> {
    let validator = FileValidator::new(
        config.max_upload_bytes(),
        config.allowed_upload_content_types().to_vec(),
    );

    let services = ServiceState {
        broker: AccessBroker::new(
            identity.clone(),
            stores.processes.clone(),
            storage.storage.clone(),
            validator,
            Duration::from_secs(config.upload_url_expiry_secs()),
        ),
        processes: ProcessService::new(stores.processes.clone(), stores.companies.clone()),
        attachments: AttachmentService::new(
            stores.processes.clone(),
            stores.collaborators.clone(),
            stores.documents.clone(),
        ),
        files: FileService::new(
            stores.processes.clone(),
            stores.collaborators.clone(),
            storage.storage.clone(),
            Duration::from_secs(config.download_url_expiry_secs()),
        ),
    };

    tracing::info!(
        upload_url_expiry_secs = config.upload_url_expiry_secs(),
        download_url_expiry_secs = config.download_url_expiry_secs(),
        allowed_content_types = %config.allowed_upload_content_types().join(","),
        "Services initialized"
    );

    Arc::new(AppState {
        config: config.clone(),
        db: DbState { pool },
        storage,
        auth: AuthState { identity },
        services,
    })
}
