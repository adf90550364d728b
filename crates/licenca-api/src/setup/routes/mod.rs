//! Route configuration and setup.
//!
//! Health checks live in [health](health).

pub mod health;

use crate::auth::middleware::auth_middleware;
use crate::constants::{API_PREFIX, STORAGE_PREFIX};
use crate::handlers::{documents, files, processes, procuration, signed_upload, storage_objects};
use crate::middleware::request_id_middleware;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post, put},
    Json, Router,
};
use licenca_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

const ALLOWED_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

fn allowed_headers() -> [HeaderName; 5] {
    [
        header::CONTENT_TYPE,
        header::AUTHORIZATION,
        HeaderName::from_static("x-client-info"),
        HeaderName::from_static("apikey"),
        HeaderName::from_static("x-upsert"),
    ]
}

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let protected_routes = protected_routes().layer(axum::middleware::from_fn_with_state(
        state.auth.clone(),
        auth_middleware,
    ));

    let app = public_routes(state.storage.max_upload_bytes)
        .merge(protected_routes)
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(RequestBodyLimitLayer::new(config.max_request_body_bytes()))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = CorsLayer::new()
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(allowed_headers());

    if config.cors_origins().iter().any(|o| o == "*") {
        if config.is_production() {
            tracing::warn!("CORS configured to allow all origins - not recommended for production");
        }
        return Ok(cors.allow_origin(Any));
    }

    let origins = config
        .cors_origins()
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin {:?}: {}", o, e))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(cors.allow_origin(origins))
}

/// Routes that authenticate on their own or not at all: the broker reads
/// the bearer token itself and signed object URLs carry their own proof.
fn public_routes(max_upload_bytes: u64) -> Router<Arc<AppState>> {
    let object_limit = usize::try_from(max_upload_bytes).unwrap_or(usize::MAX);

    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .route(
            &format!("{}/uploads/signed-url", API_PREFIX),
            post(signed_upload::create_signed_upload_url),
        )
        .route(
            &format!("{}/{{*key}}", STORAGE_PREFIX),
            put(storage_objects::put_object)
                .get(storage_objects::get_object)
                .layer(DefaultBodyLimit::max(object_limit)),
        )
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/files/download-url", API_PREFIX),
            post(files::create_download_url),
        )
        .route(
            &format!("{}/files", API_PREFIX),
            axum::routing::delete(files::delete_file),
        )
        .route(
            &format!("{}/processes", API_PREFIX),
            get(processes::list_processes).post(processes::create_process),
        )
        .route(
            &format!("{}/processes/stats", API_PREFIX),
            get(processes::process_stats),
        )
        .route(
            &format!("{}/processes/{{id}}", API_PREFIX),
            get(processes::get_process)
                .patch(processes::update_process)
                .delete(processes::delete_process),
        )
        .route(
            &format!("{}/processes/{{id}}/documents", API_PREFIX),
            get(documents::list_documents)
                .post(documents::record_document)
                .delete(documents::remove_document),
        )
        .route(
            &format!("{}/collaborators/{{id}}/procuration", API_PREFIX),
            put(procuration::set_procuration),
        )
}
