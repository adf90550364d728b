//! Application state and sub-state extractors.
//!
//! AppState is split into sub-states so handlers and middleware can extract
//! only what they need via Axum's `FromRef`.

use crate::auth::middleware::AuthState;
use crate::services::{AccessBroker, AttachmentService, FileService, ProcessService};
use licenca_core::Config;
use licenca_db::{CollaboratorStore, CompanyStore, DocumentStore, ProcessStore};
use licenca_storage::{LocalStorage, Storage};
use sqlx::PgPool;
use std::sync::Arc;

/// Connection pool; absent when the stores are not Postgres-backed.
#[derive(Clone)]
pub struct DbState {
    pub pool: Option<PgPool>,
}

/// Store implementations behind their traits
#[derive(Clone)]
pub struct Stores {
    pub processes: Arc<dyn ProcessStore>,
    pub companies: Arc<dyn CompanyStore>,
    pub collaborators: Arc<dyn CollaboratorStore>,
    pub documents: Arc<dyn DocumentStore>,
}

/// Object storage. `local` is set when the filesystem backend is active so
/// the API can serve its signed URLs.
#[derive(Clone)]
pub struct StorageState {
    pub storage: Arc<dyn Storage>,
    pub local: Option<Arc<LocalStorage>>,
    pub max_upload_bytes: u64,
}

#[derive(Clone)]
pub struct ServiceState {
    pub broker: AccessBroker,
    pub processes: ProcessService,
    pub attachments: AttachmentService,
    pub files: FileService,
}

// ----- AppState -----

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: DbState,
    pub storage: StorageState,
    pub auth: AuthState,
    pub services: ServiceState,
}

// ----- FromRef for sub-state extraction -----

impl axum::extract::FromRef<Arc<AppState>> for DbState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for StorageState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.storage.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for AuthState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.auth.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for ServiceState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.services.clone()
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
