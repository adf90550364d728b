//! Licenca Core Library
//!
//! This crate provides the domain models, error types, configuration, and pure
//! validation rules shared by the API server, the HTTP client, and the CLI.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{AppConfig, BaseConfig, Config};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
pub use validation::{
    derive_storage_path, guess_content_type, sanitize_filename, FileRejection, FileValidator,
    MAX_UPLOAD_BYTES,
};
