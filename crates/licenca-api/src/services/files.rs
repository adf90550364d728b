//! Read URLs and removal for stored objects
//!
//! Every object key starts with the id of the process it belongs to, so
//! authorization is decided from the key itself.

use crate::auth::models::Identity;
use crate::services::access::{owned_process, process_id_of_path, readable_process};
use licenca_core::models::DownloadUrlResponse;
use licenca_core::AppError;
use licenca_db::{CollaboratorStore, ProcessStore};
use licenca_storage::{validate_key, Storage};
use std::sync::Arc;
use std::time::Duration;

pub const DOWNLOAD_FORBIDDEN: &str = "You do not have permission to access files of this process";
pub const DELETE_FORBIDDEN: &str = "You do not have permission to delete files of this process";

#[derive(Clone)]
pub struct FileService {
    processes: Arc<dyn ProcessStore>,
    collaborators: Arc<dyn CollaboratorStore>,
    storage: Arc<dyn Storage>,
    download_expiry: Duration,
}

impl FileService {
    pub fn new(
        processes: Arc<dyn ProcessStore>,
        collaborators: Arc<dyn CollaboratorStore>,
        storage: Arc<dyn Storage>,
        download_expiry: Duration,
    ) -> Self {
        Self {
            processes,
            collaborators,
            storage,
            download_expiry,
        }
    }

    fn checked_key(storage_path: &str) -> Result<&str, AppError> {
        let key = storage_path.trim();
        validate_key(key).map_err(|e| AppError::InvalidRequest(e.to_string()))?;
        Ok(key)
    }

    /// Signed read URL for `storage_path`. The object's existence is not checked.
    pub async fn download_url(
        &self,
        identity: &Identity,
        storage_path: &str,
    ) -> Result<DownloadUrlResponse, AppError> {
        let key = Self::checked_key(storage_path)?;
        let process_id = process_id_of_path(key)?;
        readable_process(
            self.processes.as_ref(),
            self.collaborators.as_ref(),
            identity.user_id,
            process_id,
            DOWNLOAD_FORBIDDEN,
        )
        .await?;

        let url = self
            .storage
            .get_presigned_url(key, self.download_expiry)
            .await
            .map_err(|e| AppError::StorageUnavailable {
                message: "Failed to create signed download URL".to_string(),
                details: e.to_string(),
            })?;

        Ok(DownloadUrlResponse {
            url,
            expires_in: self.download_expiry.as_secs(),
        })
    }

    /// Remove the object at `storage_path`. Removing a missing object succeeds.
    pub async fn delete(&self, identity: &Identity, storage_path: &str) -> Result<(), AppError> {
        let key = Self::checked_key(storage_path)?;
        let process_id = process_id_of_path(key)?;
        owned_process(
            self.processes.as_ref(),
            identity.user_id,
            process_id,
            DELETE_FORBIDDEN,
        )
        .await?;

        self.storage
            .delete(key)
            .await
            .map_err(|e| AppError::StorageUnavailable {
                message: "Failed to delete file".to_string(),
                details: e.to_string(),
            })?;

        tracing::info!(
            process_id = %process_id,
            user_id = %identity.user_id,
            storage_path = %key,
            "File removed from storage"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use licenca_core::models::CollaboratorStatus;
    use licenca_db::memory::MemoryStore;
    use licenca_storage::LocalStorage;
    use uuid::Uuid;

    async fn service(store: &MemoryStore, dir: &tempfile::TempDir) -> (FileService, Arc<LocalStorage>) {
        let local = Arc::new(
            LocalStorage::new(
                dir.path(),
                "http://localhost:3000/storage".to_string(),
                "0123456789abcdef0123456789abcdef",
            )
            .await
            .unwrap(),
        );
        let service = FileService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            local.clone(),
            Duration::from_secs(3600),
        );
        (service, local)
    }

    fn identity(user_id: Uuid) -> Identity {
        Identity {
            user_id,
            email: None,
        }
    }

    #[tokio::test]
    async fn test_download_url_for_owner_and_collaborator() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let colleague = Uuid::new_v4();
        let process = store.seed_process(owner).await;
        store
            .seed_collaborator(process.id, colleague, CollaboratorStatus::Accepted)
            .await;
        let (service, _) = service(&store, &dir).await;
        let path = format!("{}/2026-10-19T12-00-00-000Z-abc123-contrato.pdf", process.id);

        let response = service.download_url(&identity(owner), &path).await.unwrap();
        assert_eq!(response.expires_in, 3600);
        assert!(response.url.contains("method=GET"));

        assert!(service.download_url(&identity(colleague), &path).await.is_ok());

        let stranger = service.download_url(&identity(Uuid::new_v4()), &path).await;
        assert!(matches!(stranger, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_pending_collaborator_cannot_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let invited = Uuid::new_v4();
        let process = store.seed_process(owner).await;
        store
            .seed_collaborator(process.id, invited, CollaboratorStatus::Pending)
            .await;
        let (service, _) = service(&store, &dir).await;
        let path = format!("{}/a.pdf", process.id);

        let result = service.download_url(&identity(invited), &path).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_invalid_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let (service, _) = service(&store, &dir).await;
        let caller = identity(Uuid::new_v4());

        for path in ["", "/etc/passwd", "a/../b"] {
            let result = service.download_url(&caller, path).await;
            assert!(matches!(result, Err(AppError::InvalidRequest(_))), "{path}");
        }
    }

    #[tokio::test]
    async fn test_delete_removes_object_and_is_owner_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let colleague = Uuid::new_v4();
        let process = store.seed_process(owner).await;
        store
            .seed_collaborator(process.id, colleague, CollaboratorStatus::Accepted)
            .await;
        let (service, local) = service(&store, &dir).await;
        let path = format!("{}/a.pdf", process.id);
        local
            .upload_with_key(&path, b"%PDF".to_vec(), "application/pdf")
            .await
            .unwrap();

        let denied = service.delete(&identity(colleague), &path).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
        assert!(local.exists(&path).await.unwrap());

        service.delete(&identity(owner), &path).await.unwrap();
        assert!(!local.exists(&path).await.unwrap());

        // already gone
        service.delete(&identity(owner), &path).await.unwrap();
    }
}
