//! Storage setup and initialization

use crate::state::StorageState;
use anyhow::{Context, Result};
use licenca_core::{Config, StorageBackend};
use licenca_storage::{create_local_storage, create_storage, Storage};
use std::sync::Arc;

/// Build the configured backend. The filesystem backend is also kept as its
/// concrete type so `/storage` can verify the URLs it signs.
pub async fn setup_storage(config: &Config) -> Result<StorageState> {
    tracing::info!("Initializing storage abstraction...");

    let (storage, local): (Arc<dyn Storage>, _) = match config.storage_backend() {
        StorageBackend::Local => {
            let local = Arc::new(
                create_local_storage(config)
                    .await
                    .context("Failed to initialize local storage")?,
            );
            (local.clone(), Some(local))
        }
        StorageBackend::S3 => (
            create_storage(config)
                .await
                .context("Failed to initialize S3 storage")?,
            None,
        ),
    };

    tracing::info!(
        backend = ?storage.backend_type(),
        bucket = %config.storage_bucket(),
        "Storage abstraction initialized successfully"
    );

    Ok(StorageState {
        storage,
        local,
        max_upload_bytes: config.max_upload_bytes(),
    })
}
