//! Access broker
//!
//! Decides whether a caller may write a new file under a license process and,
//! if so, mints a write credential: a signed PUT URL bound to a freshly
//! derived storage path. The broker holds no per-request state; the storage
//! provider enforces the credential's expiry.
//!
//! Checks run in a fixed order so the status a caller sees is predictable:
//! identity, request completeness, content type, existence, ownership.

use crate::auth::jwt::IdentityProvider;
use crate::auth::middleware::MISSING_AUTH_HEADER;
use crate::services::access::{owned_process, parse_process_id};
use chrono::Utc;
use licenca_core::models::{SignedUploadUrlRequest, UploadRequest, WriteCredential};
use licenca_core::{derive_storage_path, AppError, FileRejection, FileValidator};
use licenca_db::ProcessStore;
use licenca_storage::Storage;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const UPLOAD_FORBIDDEN: &str = "You do not have permission to upload files to this process";
pub const SIGNING_FAILED: &str = "Failed to create signed upload URL";

#[derive(Clone)]
pub struct AccessBroker {
    identity: Arc<dyn IdentityProvider>,
    processes: Arc<dyn ProcessStore>,
    storage: Arc<dyn Storage>,
    validator: FileValidator,
    upload_expiry: Duration,
}

impl AccessBroker {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        processes: Arc<dyn ProcessStore>,
        storage: Arc<dyn Storage>,
        validator: FileValidator,
        upload_expiry: Duration,
    ) -> Self {
        Self {
            identity,
            processes,
            storage,
            validator,
            upload_expiry,
        }
    }

    /// Issue a write credential for one object under the requested process.
    ///
    /// `caller_token` is the raw bearer token of the request, if any.
    pub async fn issue_write_credential(
        &self,
        caller_token: Option<&str>,
        body: SignedUploadUrlRequest,
    ) -> Result<WriteCredential, AppError> {
        let token = caller_token
            .ok_or_else(|| AppError::Unauthenticated(MISSING_AUTH_HEADER.to_string()))?;
        let identity = self.identity.resolve(token).await?;

        let request = UploadRequest::try_from(body)?;
        if !self.validator.is_allowed_content_type(&request.content_type) {
            return Err(AppError::InvalidRequest(
                FileRejection::DisallowedType {
                    content_type: request.content_type,
                }
                .to_string(),
            ));
        }

        let process_id = parse_process_id(&request.parent_resource_id)?;
        owned_process(
            self.processes.as_ref(),
            identity.user_id,
            process_id,
            UPLOAD_FORBIDDEN,
        )
        .await?;

        // namespaced by the canonical id, whatever form the caller sent
        let storage_path =
            derive_storage_path(&process_id.to_string(), &request.filename, Utc::now());

        let upload_url = self
            .storage
            .presigned_put_url(&storage_path, &request.content_type, self.upload_expiry)
            .await
            .map_err(|e| AppError::StorageUnavailable {
                message: SIGNING_FAILED.to_string(),
                details: e.to_string(),
            })?;

        tracing::info!(
            process_id = %process_id,
            user_id = %identity.user_id,
            storage_path = %storage_path,
            content_type = %request.content_type,
            "Issued signed upload URL"
        );

        Ok(WriteCredential {
            upload_url,
            storage_path,
            file_id: Uuid::new_v4().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Identity;
    use async_trait::async_trait;
    use licenca_core::StorageBackend;
    use licenca_db::memory::MemoryStore;
    use licenca_storage::{StorageError, StorageResult};

    /// Accepts any token of the form `user:{uuid}`
    struct StaticIdentity;

    #[async_trait]
    impl IdentityProvider for StaticIdentity {
        async fn resolve(&self, token: &str) -> Result<Identity, AppError> {
            token
                .strip_prefix("user:")
                .and_then(|id| Uuid::parse_str(id).ok())
                .map(|user_id| Identity {
                    user_id,
                    email: None,
                })
                .ok_or_else(|| AppError::Unauthenticated("Unauthorized".into()))
        }
    }

    struct SigningStorage {
        fail: bool,
    }

    #[async_trait]
    impl Storage for SigningStorage {
        async fn upload_with_key(&self, _: &str, _: Vec<u8>, _: &str) -> StorageResult<()> {
            Ok(())
        }
        async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
            Err(StorageError::NotFound(key.to_string()))
        }
        async fn delete(&self, _: &str) -> StorageResult<()> {
            Ok(())
        }
        async fn exists(&self, _: &str) -> StorageResult<bool> {
            Ok(false)
        }
        async fn presigned_put_url(
            &self,
            key: &str,
            _: &str,
            expires_in: Duration,
        ) -> StorageResult<String> {
            if self.fail {
                return Err(StorageError::SigningFailed("no credentials".into()));
            }
            Ok(format!(
                "https://store.test/{}?method=PUT&ttl={}",
                key,
                expires_in.as_secs()
            ))
        }
        async fn get_presigned_url(&self, key: &str, _: Duration) -> StorageResult<String> {
            Ok(format!("https://store.test/{}", key))
        }
        fn backend_type(&self) -> StorageBackend {
            StorageBackend::Local
        }
    }

    fn broker(store: &MemoryStore, fail_signing: bool) -> AccessBroker {
        AccessBroker::new(
            Arc::new(StaticIdentity),
            Arc::new(store.clone()),
            Arc::new(SigningStorage { fail: fail_signing }),
            FileValidator::default(),
            Duration::from_secs(7200),
        )
    }

    fn body(process_id: &str, filename: &str, content_type: &str) -> SignedUploadUrlRequest {
        SignedUploadUrlRequest {
            process_id: Some(process_id.to_string()),
            filename: Some(filename.to_string()),
            content_type: Some(content_type.to_string()),
        }
    }

    fn token(user: Uuid) -> String {
        format!("user:{}", user)
    }

    #[tokio::test]
    async fn test_owner_gets_credential() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let process = store.seed_process(owner).await;
        let pid = process.id.to_string();

        let credential = broker(&store, false)
            .issue_write_credential(
                Some(&token(owner)),
                body(&pid, "contrato.pdf", "application/pdf"),
            )
            .await
            .unwrap();

        assert!(credential.storage_path.starts_with(&format!("{}/", pid)));
        assert!(credential.storage_path.ends_with("-contrato.pdf"));
        assert!(credential.upload_url.contains(&credential.storage_path));
        assert!(credential.upload_url.ends_with("ttl=7200"));
        assert!(Uuid::parse_str(&credential.file_id).is_ok());
    }

    #[tokio::test]
    async fn test_path_uses_canonical_process_id() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let process = store.seed_process(owner).await;
        let canonical = format!("{}/", process.id);

        for raw in [
            process.id.to_string().to_uppercase(),
            process.id.simple().to_string(),
        ] {
            let credential = broker(&store, false)
                .issue_write_credential(
                    Some(&token(owner)),
                    body(&raw, "contrato.pdf", "application/pdf"),
                )
                .await
                .unwrap();
            assert!(
                credential.storage_path.starts_with(&canonical),
                "{raw} gave {}",
                credential.storage_path
            );
        }
    }

    #[tokio::test]
    async fn test_missing_token_before_missing_fields() {
        let store = MemoryStore::new();
        match broker(&store, false)
            .issue_write_credential(None, SignedUploadUrlRequest::default())
            .await
        {
            Err(AppError::Unauthenticated(msg)) => assert_eq!(msg, MISSING_AUTH_HEADER),
            other => panic!("expected Unauthenticated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_token() {
        let store = MemoryStore::new();
        let result = broker(&store, false)
            .issue_write_credential(Some("garbage"), body("x", "a.pdf", "application/pdf"))
            .await;
        assert!(matches!(result, Err(AppError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let store = MemoryStore::new();
        let mut request = body("x", "a.pdf", "application/pdf");
        request.filename = Some(String::new());
        match broker(&store, false)
            .issue_write_credential(Some(&token(Uuid::new_v4())), request)
            .await
        {
            Err(AppError::InvalidRequest(msg)) => {
                assert_eq!(msg, licenca_core::models::upload::MISSING_FIELDS_MESSAGE)
            }
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_disallowed_content_type() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let process = store.seed_process(owner).await;
        let result = broker(&store, false)
            .issue_write_credential(
                Some(&token(owner)),
                body(&process.id.to_string(), "run.exe", "application/x-msdownload"),
            )
            .await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_process_are_not_found() {
        let store = MemoryStore::new();
        let broker = broker(&store, false);
        let caller = token(Uuid::new_v4());
        for pid in [Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
            match broker
                .issue_write_credential(Some(&caller), body(&pid, "a.pdf", "application/pdf"))
                .await
            {
                Err(AppError::NotFound(msg)) => assert_eq!(msg, "Process not found"),
                other => panic!("expected NotFound, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_non_owner_is_forbidden_even_as_collaborator() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let colleague = Uuid::new_v4();
        let process = store.seed_process(owner).await;
        store
            .seed_collaborator(
                process.id,
                colleague,
                licenca_core::models::CollaboratorStatus::Accepted,
            )
            .await;

        match broker(&store, false)
            .issue_write_credential(
                Some(&token(colleague)),
                body(&process.id.to_string(), "a.pdf", "application/pdf"),
            )
            .await
        {
            Err(AppError::Forbidden(msg)) => assert_eq!(msg, UPLOAD_FORBIDDEN),
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_signing_failure_is_storage_unavailable() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let process = store.seed_process(owner).await;
        match broker(&store, true)
            .issue_write_credential(
                Some(&token(owner)),
                body(&process.id.to_string(), "a.pdf", "application/pdf"),
            )
            .await
        {
            Err(AppError::StorageUnavailable { message, .. }) => {
                assert_eq!(message, SIGNING_FAILED)
            }
            other => panic!("expected StorageUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_repeated_issuance_yields_distinct_paths() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let process = store.seed_process(owner).await;
        let broker = broker(&store, false);
        let request = body(&process.id.to_string(), "contrato.pdf", "application/pdf");

        let first = broker
            .issue_write_credential(Some(&token(owner)), request.clone())
            .await
            .unwrap();
        let second = broker
            .issue_write_credential(Some(&token(owner)), request)
            .await
            .unwrap();
        assert_ne!(first.storage_path, second.storage_path);
        assert_ne!(first.file_id, second.file_id);
    }
}
