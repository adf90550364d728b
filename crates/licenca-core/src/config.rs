//! Configuration module
//!
//! Environment-driven configuration for the API server: HTTP listener,
//! database pool, bearer-token verification, and the storage backend that
//! mints signed upload and download URLs.

use std::env;
use std::str::FromStr;

use crate::storage_types::StorageBackend;
use crate::validation::upload::{ALLOWED_CONTENT_TYPES, MAX_UPLOAD_BYTES};

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const SERVER_PORT: u16 = 3000;
const MAX_REQUEST_BODY_BYTES: usize = 60 * 1024 * 1024;
const UPLOAD_URL_EXPIRY_SECS: u64 = 2 * 60 * 60;
const DOWNLOAD_URL_EXPIRY_SECS: u64 = 60 * 60;
const DEFAULT_BUCKET: &str = "docs";

/// Listener, database, and authentication settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    /// HS256 secret shared with the identity provider
    pub jwt_secret: String,
    /// Expected `aud` claim; unchecked when unset
    pub jwt_audience: Option<String>,
    pub environment: String,
    pub max_request_body_bytes: usize,
}

/// Full application configuration
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub base: BaseConfig,
    pub database_url: String,
    pub storage_backend: StorageBackend,
    pub storage_bucket: String,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    pub storage_signing_secret: String,
    pub upload_url_expiry_secs: u64,
    pub download_url_expiry_secs: u64,
    pub max_upload_bytes: u64,
    pub allowed_upload_content_types: Vec<String>,
}

/// Application configuration handle.
#[derive(Clone, Debug)]
pub struct Config(pub Box<AppConfig>);

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    fn inner(&self) -> &AppConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.inner().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = AppConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_host(&self) -> &str {
        &self.inner().base.server_host
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner().base.jwt_secret
    }

    pub fn jwt_audience(&self) -> Option<&str> {
        self.inner().base.jwt_audience.as_deref()
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn max_request_body_bytes(&self) -> usize {
        self.inner().base.max_request_body_bytes
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn storage_bucket(&self) -> &str {
        &self.inner().storage_bucket
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> &str {
        &self.inner().local_storage_path
    }

    pub fn local_storage_base_url(&self) -> &str {
        &self.inner().local_storage_base_url
    }

    pub fn storage_signing_secret(&self) -> &str {
        &self.inner().storage_signing_secret
    }

    pub fn upload_url_expiry_secs(&self) -> u64 {
        self.inner().upload_url_expiry_secs
    }

    pub fn download_url_expiry_secs(&self) -> u64 {
        self.inner().download_url_expiry_secs
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.inner().max_upload_bytes
    }

    pub fn allowed_upload_content_types(&self) -> &[String] {
        &self.inner().allowed_upload_content_types
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?;

        let base = BaseConfig {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .or_else(|_| env::var("PORT"))
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SERVER_PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            jwt_secret: jwt_secret.clone(),
            jwt_audience: env::var("JWT_AUDIENCE").ok().filter(|s| !s.is_empty()),
            environment,
            max_request_body_bytes: env_parse("MAX_REQUEST_BODY_BYTES", MAX_REQUEST_BODY_BYTES),
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::Local,
        };

        let allowed_upload_content_types = env::var("ALLOWED_UPLOAD_CONTENT_TYPES")
            .map(|raw| split_list(&raw))
            .unwrap_or_else(|_| ALLOWED_CONTENT_TYPES.iter().map(|s| s.to_string()).collect());

        Ok(AppConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            storage_bucket: env::var("STORAGE_BUCKET")
                .or_else(|_| env::var("S3_BUCKET"))
                .unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| "./storage".to_string()),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/storage".to_string()),
            storage_signing_secret: env::var("STORAGE_SIGNING_SECRET").unwrap_or(jwt_secret),
            upload_url_expiry_secs: env_parse("UPLOAD_URL_EXPIRY_SECONDS", UPLOAD_URL_EXPIRY_SECS),
            download_url_expiry_secs: env_parse(
                "DOWNLOAD_URL_EXPIRY_SECONDS",
                DOWNLOAD_URL_EXPIRY_SECS,
            ),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", MAX_UPLOAD_BYTES),
            allowed_upload_content_types,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !(self.database_url.starts_with("postgres://")
            || self.database_url.starts_with("postgresql://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.base.db_max_connections == 0 {
            return Err(anyhow::anyhow!("Database max connections cannot be 0"));
        }

        if self.base.db_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("Database timeout cannot be 0"));
        }

        if self.upload_url_expiry_secs == 0 || self.download_url_expiry_secs == 0 {
            return Err(anyhow::anyhow!("Signed URL expiry cannot be 0"));
        }

        if self.allowed_upload_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_UPLOAD_CONTENT_TYPES must list at least one content type"
            ));
        }

        if self.storage_bucket.trim().is_empty() {
            return Err(anyhow::anyhow!("STORAGE_BUCKET cannot be empty"));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage_signing_secret.len() < 32 {
                    return Err(anyhow::anyhow!(
                        "STORAGE_SIGNING_SECRET must be at least 32 characters long"
                    ));
                }
                if !(self.local_storage_base_url.starts_with("http://")
                    || self.local_storage_base_url.starts_with("https://"))
                {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be an http(s) URL"
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppConfig {
        AppConfig {
            base: BaseConfig {
                server_host: "127.0.0.1".into(),
                server_port: 3000,
                cors_origins: vec!["*".into()],
                db_max_connections: 5,
                db_timeout_seconds: 30,
                jwt_secret: "x".repeat(32),
                jwt_audience: None,
                environment: "development".into(),
                max_request_body_bytes: MAX_REQUEST_BODY_BYTES,
            },
            database_url: "postgresql://postgres@localhost/licenca".into(),
            storage_backend: StorageBackend::Local,
            storage_bucket: DEFAULT_BUCKET.into(),
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: "./storage".into(),
            local_storage_base_url: "http://localhost:3000/storage".into(),
            storage_signing_secret: "y".repeat(32),
            upload_url_expiry_secs: UPLOAD_URL_EXPIRY_SECS,
            download_url_expiry_secs: DOWNLOAD_URL_EXPIRY_SECS,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            allowed_upload_content_types: vec!["application/pdf".into()],
        }
    }

    #[test]
    fn valid_local_config_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn short_jwt_secret_is_rejected() {
        let mut config = sample();
        config.base.jwt_secret = "short".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn s3_requires_region() {
        let mut config = sample();
        config.storage_backend = StorageBackend::S3;
        assert!(config.validate().is_err());
        config.s3_region = Some("sa-east-1".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn production_detection() {
        let mut config = sample();
        config.base.environment = "Production".into();
        assert!(Config(Box::new(config)).is_production());
    }

    #[test]
    fn split_list_trims_and_lowercases() {
        assert_eq!(
            split_list(" Application/PDF, ,image/png"),
            vec!["application/pdf".to_string(), "image/png".to_string()]
        );
    }
}
