//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use licenca_core::Config;

/// Validate critical configuration values
///
/// Runs the field-level checks of [`Config::validate`] plus the deployment
/// rules that depend on the environment.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let is_production = config.is_production();
    let env_var = std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .ok();

    if is_production && env_var.is_none() {
        tracing::warn!(
            "Production mode detected but ENVIRONMENT/APP_ENV not set - error details may leak"
        );
    }

    if is_production && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Set specific allowed origins via CORS_ORIGINS."
        ));
    }

    if config.cors_origins().is_empty() {
        return Err(anyhow::anyhow!("CORS_ORIGINS cannot be empty"));
    }

    if config.max_upload_bytes() as u128 > config.max_request_body_bytes() as u128 {
        tracing::warn!(
            max_upload_bytes = config.max_upload_bytes(),
            max_request_body_bytes = config.max_request_body_bytes(),
            "Upload size limit exceeds the request body limit; large uploads will be rejected early"
        );
    }

    tracing::info!("Configuration validation passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use licenca_core::{AppConfig, BaseConfig, StorageBackend};

    fn config(environment: &str, cors: &[&str]) -> Config {
        Config(Box::new(AppConfig {
            base: BaseConfig {
                server_host: "127.0.0.1".into(),
                server_port: 3000,
                cors_origins: cors.iter().map(|s| s.to_string()).collect(),
                db_max_connections: 5,
                db_timeout_seconds: 30,
                jwt_secret: "s".repeat(32),
                jwt_audience: None,
                environment: environment.into(),
                max_request_body_bytes: 60 * 1024 * 1024,
            },
            database_url: "postgres://localhost/licenca".into(),
            storage_backend: StorageBackend::Local,
            storage_bucket: "docs".into(),
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: "./storage".into(),
            local_storage_base_url: "http://localhost:3000/storage".into(),
            storage_signing_secret: "k".repeat(32),
            upload_url_expiry_secs: 7200,
            download_url_expiry_secs: 3600,
            max_upload_bytes: 10 * 1024 * 1024,
            allowed_upload_content_types: vec!["application/pdf".into()],
        }))
    }

    #[test]
    fn test_wildcard_cors_allowed_outside_production() {
        assert!(validate_config(&config("development", &["*"])).is_ok());
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        assert!(validate_config(&config("production", &["*"])).is_err());
        assert!(validate_config(&config("production", &["https://app.example.com"])).is_ok());
    }

    #[test]
    fn test_field_checks_still_apply() {
        let mut cfg = config("development", &["*"]);
        cfg.0.base.jwt_secret = "short".into();
        assert!(validate_config(&cfg).is_err());
    }
}
