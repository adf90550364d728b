//! Test helpers: build AppState and router for integration tests.
//!
//! Stores are in-memory and objects land in a temporary directory, so the
//! suites need neither Postgres nor S3. Run with `cargo test -p licenca-api`.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use licenca_api::auth::{Claims, JwtIdentityProvider};
use licenca_api::constants;
use licenca_api::setup::{routes, services, storage};
use licenca_api::state::Stores;
use licenca_core::validation::ALLOWED_CONTENT_TYPES;
use licenca_core::{AppConfig, BaseConfig, Config, StorageBackend};
use licenca_db::memory::MemoryStore;
use licenca_storage::{Storage, StorageError, StorageResult};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-0123456789abcdef";
pub const TEST_SIGNING_SECRET: &str = "test-signing-secret-0123456789ab";
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// API path prefix for tests (e.g. `/api/v0/processes`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

pub fn test_config(storage_dir: &TempDir, storage_base_url: &str) -> Config {
    Config(Box::new(AppConfig {
        base: BaseConfig {
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            db_max_connections: 1,
            db_timeout_seconds: 5,
            jwt_secret: TEST_JWT_SECRET.to_string(),
            jwt_audience: None,
            environment: "test".to_string(),
            max_request_body_bytes: 60 * 1024 * 1024,
        },
        database_url: String::new(),
        storage_backend: StorageBackend::Local,
        storage_bucket: "docs".to_string(),
        s3_region: None,
        s3_endpoint: None,
        local_storage_path: storage_dir.path().to_string_lossy().into_owned(),
        local_storage_base_url: storage_base_url.to_string(),
        storage_signing_secret: TEST_SIGNING_SECRET.to_string(),
        upload_url_expiry_secs: 7200,
        download_url_expiry_secs: 3600,
        max_upload_bytes: MAX_UPLOAD_BYTES,
        allowed_upload_content_types: ALLOWED_CONTENT_TYPES
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }))
}

/// Signed bearer token for `user_id`, valid for one hour.
pub fn token_for(user_id: Uuid) -> String {
    let claims = Claims {
        sub: user_id,
        email: Some(format!("{}@example.com", user_id.simple())),
        exp: chrono::Utc::now().timestamp() + 3600,
        aud: Some("authenticated".to_string()),
        role: Some("authenticated".to_string()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("Failed to sign test token")
}

pub fn bearer(user_id: Uuid) -> String {
    format!("Bearer {}", token_for(user_id))
}

/// Router over a fresh in-memory store. Signed object URLs point at
/// `storage_base_url`.
pub async fn build_app(storage_base_url: &str) -> (Router, MemoryStore, TempDir) {
    build_app_with_storage(storage_base_url, |storage| storage).await
}

/// Like [`build_app`], with the services' storage replaced by `wrap(storage)`.
/// `/storage` keeps serving from the local backend underneath.
pub async fn build_app_with_storage(
    storage_base_url: &str,
    wrap: impl FnOnce(Arc<dyn Storage>) -> Arc<dyn Storage>,
) -> (Router, MemoryStore, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = test_config(&temp_dir, storage_base_url);

    let store = MemoryStore::new();
    let stores = Stores {
        processes: Arc::new(store.clone()),
        companies: Arc::new(store.clone()),
        collaborators: Arc::new(store.clone()),
        documents: Arc::new(store.clone()),
    };
    let mut storage = storage::setup_storage(&config)
        .await
        .expect("Failed to set up local storage");
    storage.storage = wrap(storage.storage);
    let identity = Arc::new(JwtIdentityProvider::new(
        config.jwt_secret(),
        config.jwt_audience(),
    ));

    let state = services::initialize_services(&config, None, stores, storage, identity);
    let app = routes::setup_routes(&config, state).expect("Failed to build routes");
    (app, store, temp_dir)
}

/// Test application: server, store, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub store: MemoryStore,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub async fn setup_test_app() -> TestApp {
    let (app, store, temp_dir) = build_app("http://localhost/storage").await;
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");
    TestApp {
        server,
        store,
        _temp_dir: temp_dir,
    }
}

/// Backend whose deletes always fail; everything else goes to `inner`.
pub struct FailingDeleteStorage {
    inner: Arc<dyn Storage>,
}

impl FailingDeleteStorage {
    pub fn wrap(inner: Arc<dyn Storage>) -> Arc<dyn Storage> {
        Arc::new(Self { inner })
    }
}

#[async_trait]
impl Storage for FailingDeleteStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()> {
        self.inner.upload_with_key(storage_key, data, content_type).await
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.inner.download(storage_key).await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        Err(StorageError::DeleteFailed(format!("refusing to delete {}", storage_key)))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.inner.exists(storage_key).await
    }

    async fn presigned_put_url(
        &self,
        storage_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.inner
            .presigned_put_url(storage_key, content_type, expires_in)
            .await
    }

    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.inner.get_presigned_url(storage_key, expires_in).await
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}
