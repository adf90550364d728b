//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from main.rs
//! for better organization and testability.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod validation;

use crate::auth::JwtIdentityProvider;
use crate::state::AppState;
use crate::telemetry::{init_telemetry, LogFormat};
use anyhow::{Context, Result};
use licenca_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    init_telemetry(LogFormat::from_env())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let stores = database::postgres_stores(&pool);
    let storage = storage::setup_storage(&config).await?;
    let identity = Arc::new(JwtIdentityProvider::new(
        config.jwt_secret(),
        config.jwt_audience(),
    ));

    let state = services::initialize_services(&config, Some(pool), stores, storage, identity);
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
