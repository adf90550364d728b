//! File metadata recorded on the entities that own uploaded objects:
//! documents of a process and the procuration of a collaborator.

use crate::auth::models::Identity;
use crate::services::access::{owned_process, process_id_of_path, readable_process};
use licenca_core::models::{
    NewProcessDocument, ProcessCollaborator, ProcessDocument, RecordDocumentRequest,
    StoredFileMetadata,
};
use licenca_core::AppError;
use licenca_db::{CollaboratorStore, DocumentStore, ProcessStore};
use std::sync::Arc;
use uuid::Uuid;

const DOCUMENTS_FORBIDDEN: &str = "Only the process owner can manage its documents";
const DOCUMENTS_READ_FORBIDDEN: &str = "You do not have access to this process";
const PROCURATION_FORBIDDEN: &str = "Only the process owner can manage procurations";

#[derive(Clone)]
pub struct AttachmentService {
    processes: Arc<dyn ProcessStore>,
    collaborators: Arc<dyn CollaboratorStore>,
    documents: Arc<dyn DocumentStore>,
}

/// Uploaded objects must live under the process they are recorded on.
fn ensure_under_process(storage_path: &str, process_id: Uuid) -> Result<(), AppError> {
    match process_id_of_path(storage_path) {
        Ok(parent) if parent == process_id => Ok(()),
        _ => Err(AppError::InvalidRequest(format!(
            "Storage path must be under process {}",
            process_id
        ))),
    }
}

impl AttachmentService {
    pub fn new(
        processes: Arc<dyn ProcessStore>,
        collaborators: Arc<dyn CollaboratorStore>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            processes,
            collaborators,
            documents,
        }
    }

    pub async fn list_documents(
        &self,
        identity: &Identity,
        process_id: Uuid,
    ) -> Result<Vec<ProcessDocument>, AppError> {
        readable_process(
            self.processes.as_ref(),
            self.collaborators.as_ref(),
            identity.user_id,
            process_id,
            DOCUMENTS_READ_FORBIDDEN,
        )
        .await?;
        self.documents.list_documents(process_id).await
    }

    /// Record an uploaded document; recording the same path again overwrites it.
    pub async fn record_document(
        &self,
        identity: &Identity,
        process_id: Uuid,
        request: RecordDocumentRequest,
    ) -> Result<ProcessDocument, AppError> {
        owned_process(
            self.processes.as_ref(),
            identity.user_id,
            process_id,
            DOCUMENTS_FORBIDDEN,
        )
        .await?;
        ensure_under_process(&request.storage_path, process_id)?;
        if request.filename.trim().is_empty() {
            return Err(AppError::InvalidRequest("filename is required".to_string()));
        }
        let file_size = i64::try_from(request.file_size)
            .map_err(|_| AppError::InvalidRequest("fileSize is out of range".to_string()))?;

        let document = self
            .documents
            .record_document(NewProcessDocument {
                process_id,
                name: request.filename,
                file_path: request.storage_path,
                file_size,
                file_type: request.file_type,
                uploaded_by: identity.user_id,
            })
            .await?;

        tracing::info!(
            process_id = %process_id,
            document_id = %document.id,
            storage_path = %document.file_path,
            "Process document recorded"
        );
        Ok(document)
    }

    /// Clear a document record. Clearing a path that was never recorded succeeds.
    pub async fn remove_document(
        &self,
        identity: &Identity,
        process_id: Uuid,
        storage_path: &str,
    ) -> Result<(), AppError> {
        owned_process(
            self.processes.as_ref(),
            identity.user_id,
            process_id,
            DOCUMENTS_FORBIDDEN,
        )
        .await?;
        let removed = self
            .documents
            .remove_document(process_id, storage_path)
            .await?;
        tracing::debug!(process_id = %process_id, storage_path, removed, "Process document cleared");
        Ok(())
    }

    /// Overwrite or clear (all-empty record) a collaborator's procuration.
    pub async fn set_procuration(
        &self,
        identity: &Identity,
        collaborator_id: Uuid,
        stored: StoredFileMetadata,
    ) -> Result<ProcessCollaborator, AppError> {
        let collaborator = self
            .collaborators
            .find_collaborator(collaborator_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Collaborator not found".to_string()))?;

        owned_process(
            self.processes.as_ref(),
            identity.user_id,
            collaborator.process_id,
            PROCURATION_FORBIDDEN,
        )
        .await?;

        if !stored.is_cleared() {
            ensure_under_process(&stored.storage_path, collaborator.process_id)?;
        }

        self.collaborators
            .set_procuration(collaborator_id, &stored)
            .await?
            .ok_or_else(|| AppError::NotFound("Collaborator not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use licenca_core::models::{CollaboratorStatus, FileMetadata};
    use licenca_db::memory::MemoryStore;

    fn service(store: &MemoryStore) -> AttachmentService {
        AttachmentService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        )
    }

    fn caller(user_id: Uuid) -> Identity {
        Identity {
            user_id,
            email: None,
        }
    }

    fn document(process_id: Uuid, name: &str) -> RecordDocumentRequest {
        RecordDocumentRequest {
            storage_path: format!("{}/2026-10-19T12-00-00-000Z-abc123-{}", process_id, name),
            filename: name.to_string(),
            file_size: 1024,
            file_type: "application/pdf".to_string(),
        }
    }

    #[tokio::test]
    async fn test_record_list_and_remove_documents() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let process = store.seed_process(owner).await;
        let service = service(&store);

        let recorded = service
            .record_document(&caller(owner), process.id, document(process.id, "mapa.pdf"))
            .await
            .unwrap();
        assert_eq!(recorded.name, "mapa.pdf");
        assert_eq!(recorded.file_size, 1024);
        assert_eq!(recorded.uploaded_by, owner);

        let listed = service.list_documents(&caller(owner), process.id).await.unwrap();
        assert_eq!(listed.len(), 1);

        service
            .remove_document(&caller(owner), process.id, &recorded.file_path)
            .await
            .unwrap();
        assert!(store.documents().await.is_empty());

        // clearing twice is fine
        service
            .remove_document(&caller(owner), process.id, &recorded.file_path)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_document_path_must_belong_to_process() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let process = store.seed_process(owner).await;
        let other = store.seed_process(owner).await;

        let result = service(&store)
            .record_document(&caller(owner), process.id, document(other.id, "mapa.pdf"))
            .await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_collaborator_reads_but_cannot_record() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let colleague = Uuid::new_v4();
        let process = store.seed_process(owner).await;
        store
            .seed_collaborator(process.id, colleague, CollaboratorStatus::Accepted)
            .await;
        let service = service(&store);

        assert!(service
            .list_documents(&caller(colleague), process.id)
            .await
            .is_ok());
        let denied = service
            .record_document(&caller(colleague), process.id, document(process.id, "a.pdf"))
            .await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_set_and_clear_procuration() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let process = store.seed_process(owner).await;
        let collaborator = store
            .seed_collaborator(process.id, Uuid::new_v4(), CollaboratorStatus::Accepted)
            .await;
        let service = service(&store);

        let stored = StoredFileMetadata {
            file_id: Uuid::new_v4().to_string(),
            storage_path: format!("{}/2026-10-19T12-00-00-000Z-abc123-procuracao.pdf", process.id),
            metadata: FileMetadata::new("procuracao.pdf", 2048, "application/pdf"),
        };
        let updated = service
            .set_procuration(&caller(owner), collaborator.id, stored.clone())
            .await
            .unwrap();
        assert_eq!(updated.procuration(), Some(stored));

        let cleared = service
            .set_procuration(&caller(owner), collaborator.id, StoredFileMetadata::cleared())
            .await
            .unwrap();
        assert!(cleared.procuration().unwrap().is_cleared());
    }

    #[tokio::test]
    async fn test_procuration_requires_owner() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let colleague = Uuid::new_v4();
        let process = store.seed_process(owner).await;
        let collaborator = store
            .seed_collaborator(process.id, colleague, CollaboratorStatus::Accepted)
            .await;

        let result = service(&store)
            .set_procuration(&caller(colleague), collaborator.id, StoredFileMetadata::cleared())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let missing = service(&store)
            .set_procuration(&caller(owner), Uuid::new_v4(), StoredFileMetadata::cleared())
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
