//! Licenca Storage Library
//!
//! Object storage abstraction for uploaded process documents. The API never
//! proxies upload bytes: it hands the client a short-lived signed URL and the
//! client writes straight to the backend.
//!
//! # Storage key format
//!
//! Every object lives under the id of the resource that owns it:
//! `{parent_id}/{timestamp}-{suffix}-{sanitized_filename}`. Keys are derived in
//! `licenca_core::validation::storage_path`; backends only check that a key
//! stays inside the bucket (no `..` segments, no leading `/`, no empty
//! segments).

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod signing;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-local")]
pub use factory::create_local_storage;
pub use factory::create_storage;
pub use licenca_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use signing::{SignatureError, SignedRequest, UrlSigner};
pub use traits::{validate_key, Storage, StorageError, StorageResult};
