//! Health check handler and response types.

use crate::state::{DbState, StorageState};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use utoipa::ToSchema;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);
const HEALTHY: &str = "healthy";

/// Run an async check with timeout; returns status string "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => HEALTHY.to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheck {
    pub database: String,
    pub storage: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    #[serde(flatten)]
    pub checks: HealthCheck,
}

/// Database and storage reachability
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(
    State(db): State<DbState>,
    State(storage): State<StorageState>,
) -> impl IntoResponse {
    let database = match db.pool {
        Some(pool) => {
            run_check(
                CHECK_TIMEOUT,
                async move { sqlx::query("SELECT 1").execute(&pool).await.map(drop) },
                "unhealthy",
            )
            .await
        }
        None => "not_configured".to_string(),
    };

    let store = storage.storage.clone();
    let storage = run_check(
        CHECK_TIMEOUT,
        async move { store.exists("health-check-non-existent-key").await.map(drop) },
        "degraded",
    )
    .await;

    let healthy = database == HEALTHY || database == "not_configured";
    if !healthy {
        tracing::error!(database = %database, "Health check failed");
    }
    let (status_code, status) = if healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            checks: HealthCheck { database, storage },
        }),
    )
}
