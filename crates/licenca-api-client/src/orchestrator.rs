//! Upload orchestrator
//!
//! Client side of the upload flow: validate a candidate file locally, obtain
//! a write credential from the broker, PUT the bytes straight to the object
//! store, then record the file's metadata on the entity that owns it.
//! Nothing is retried; a failed attempt is reported and left to the caller.

use crate::phase::{UploadPhase, UploadTracker};
use crate::progress::{with_synthesized_progress, PROGRESS_TICK};
use crate::{ApiClient, UploadError};
use futures::future::try_join_all;
use licenca_core::models::{
    DownloadUrlResponse, FileMetadata, NewProcessInput, ProcessWithCompany, RecordDocumentRequest,
    StoredFileMetadata, WriteCredential,
};
use licenca_core::{guess_content_type, FileValidator};
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

/// A file chosen for upload, held in memory
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl CandidateFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk. Without an explicit content type it is
    /// guessed from the extension.
    pub async fn from_path(path: &Path, content_type: Option<&str>) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("arquivo")
            .to_string();
        let content_type = content_type
            .map(String::from)
            .unwrap_or_else(|| guess_content_type(&filename).to_string());
        Ok(Self {
            filename,
            content_type,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Entity an uploaded file is recorded on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerRef {
    /// The procuration of a process collaborator
    Collaborator(Uuid),
    /// A supporting document of a process
    ProcessDocument(Uuid),
}

/// Result of a completed transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub storage_path: String,
    pub file_id: String,
    pub metadata: FileMetadata,
}

impl UploadedFile {
    pub fn stored(&self) -> StoredFileMetadata {
        StoredFileMetadata {
            file_id: self.file_id.clone(),
            storage_path: self.storage_path.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

/// What a delete actually achieved.
///
/// The owner's record is always cleared; the stored object may survive when
/// the storage remove fails, leaving an orphan the caller can retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub storage_removed: bool,
}

#[derive(Debug, Clone)]
pub struct UploadOrchestrator {
    client: ApiClient,
    validator: FileValidator,
    progress_tick: Duration,
}

impl UploadOrchestrator {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            validator: FileValidator::default(),
            progress_tick: PROGRESS_TICK,
        }
    }

    pub fn with_validator(mut self, validator: FileValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Size and type checks; no network access.
    pub fn validate(&self, file: &CandidateFile) -> Result<(), UploadError> {
        self.validator
            .validate(file.size(), &file.content_type)
            .map_err(UploadError::from)
    }

    async fn request_credential(
        &self,
        parent_id: &str,
        file: &CandidateFile,
    ) -> Result<WriteCredential, UploadError> {
        self.client
            .signed_upload_url(parent_id, &file.filename, &file.content_type)
            .await
            .map_err(UploadError::from)
    }

    async fn transfer(
        &self,
        credential: &WriteCredential,
        file: &CandidateFile,
    ) -> Result<(), UploadError> {
        let response = self
            .client
            .http()
            .put(&credential.upload_url)
            .header(reqwest::header::CONTENT_TYPE, &file.content_type)
            .header("x-upsert", "true")
            .body(file.bytes.clone())
            .send()
            .await
            .map_err(|e| UploadError::TransferFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::TransferFailed(format!("{}: {}", status, body)));
        }
        Ok(())
    }

    fn uploaded(credential: WriteCredential, file: &CandidateFile) -> UploadedFile {
        UploadedFile {
            storage_path: credential.storage_path,
            file_id: credential.file_id,
            metadata: FileMetadata::new(&file.filename, file.size(), &file.content_type),
        }
    }

    /// Validate, obtain a credential and transfer the bytes. Metadata is not
    /// recorded; see [`Self::persist_metadata`] or [`Self::run`].
    pub async fn upload(
        &self,
        parent_id: &str,
        file: &CandidateFile,
    ) -> Result<UploadedFile, UploadError> {
        self.validate(file)?;
        let credential = self.request_credential(parent_id, file).await?;
        self.transfer(&credential, file).await?;
        Ok(Self::uploaded(credential, file))
    }

    /// Overwrite the owner's record with `stored`. For a collaborator a
    /// cleared record blanks the procuration.
    pub async fn persist_metadata(
        &self,
        owner: OwnerRef,
        stored: &StoredFileMetadata,
    ) -> Result<(), UploadError> {
        let result = match owner {
            OwnerRef::Collaborator(id) => self.client.set_procuration(id, stored).await.map(drop),
            OwnerRef::ProcessDocument(process_id) => {
                if stored.is_cleared() {
                    return Err(UploadError::InvalidRequest(
                        "Document records are cleared by storage path".to_string(),
                    ));
                }
                let request = RecordDocumentRequest {
                    storage_path: stored.storage_path.clone(),
                    filename: stored.metadata.filename.clone(),
                    file_size: stored.metadata.file_size,
                    file_type: stored.metadata.file_type.clone(),
                };
                self.client
                    .record_document(process_id, &request)
                    .await
                    .map(drop)
            }
        };
        result.map_err(|e| UploadError::PersistFailed(e.to_string()))
    }

    async fn clear_metadata(&self, owner: OwnerRef, storage_path: &str) -> Result<(), UploadError> {
        let result = match owner {
            OwnerRef::Collaborator(id) => self
                .client
                .set_procuration(id, &StoredFileMetadata::cleared())
                .await
                .map(drop),
            OwnerRef::ProcessDocument(process_id) => {
                self.client.remove_document(process_id, storage_path).await
            }
        };
        result.map_err(|e| UploadError::PersistFailed(e.to_string()))
    }

    /// One full attempt, published through `tracker`: validation, credential,
    /// transfer with synthesized progress, then metadata.
    ///
    /// A rejected file returns the tracker to `Idle`; any later failure
    /// leaves it in `Failed` until [`UploadTracker::reset`] or the next `run`.
    pub async fn run(
        &self,
        owner: OwnerRef,
        parent_id: &str,
        file: &CandidateFile,
        tracker: &UploadTracker,
    ) -> Result<UploadedFile, UploadError> {
        if tracker.phase() == UploadPhase::Failed {
            tracker.reset()?;
        }
        tracker.advance(UploadPhase::Selected)?;
        tracker.advance(UploadPhase::Validating)?;

        if let Err(rejection) = self.validate(file) {
            tracker.advance(UploadPhase::Rejected)?;
            tracker.advance(UploadPhase::Idle)?;
            tracing::debug!(filename = %file.filename, error = %rejection, "Upload rejected");
            return Err(rejection);
        }
        tracker.advance(UploadPhase::Validated)?;

        tracker.advance(UploadPhase::RequestingCredential)?;
        let credential = self
            .request_credential(parent_id, file)
            .await
            .map_err(|e| tracker.fail(e))?;

        tracker.advance(UploadPhase::Transferring)?;
        with_synthesized_progress(
            tracker.progress_sender(),
            self.progress_tick,
            self.transfer(&credential, file),
        )
        .await
        .map_err(|e| tracker.fail(e))?;

        let uploaded = Self::uploaded(credential, file);

        tracker.advance(UploadPhase::Persisting)?;
        self.persist_metadata(owner, &uploaded.stored())
            .await
            .map_err(|e| {
                tracing::warn!(
                    storage_path = %uploaded.storage_path,
                    error = %e,
                    "File stored but metadata was not recorded"
                );
                tracker.fail(e)
            })?;

        tracker.advance(UploadPhase::Done)?;
        tracing::info!(
            storage_path = %uploaded.storage_path,
            size_bytes = uploaded.metadata.file_size,
            "Upload complete"
        );
        Ok(uploaded)
    }

    /// Create a process, then upload every file as one of its documents.
    ///
    /// All files are validated before the process is created. The uploads
    /// run concurrently and the first failure is returned; the process and
    /// any documents already recorded are kept.
    pub async fn create_process_with_documents(
        &self,
        input: &NewProcessInput,
        files: &[CandidateFile],
    ) -> Result<(ProcessWithCompany, Vec<UploadedFile>), UploadError> {
        for file in files {
            self.validate(file)?;
        }

        let created = self.client.create_process(input).await?;
        let process_id = created.process.id;
        let parent_id = process_id.to_string();

        let uploads = files.iter().map(|file| {
            let parent_id = parent_id.as_str();
            async move {
                let tracker = UploadTracker::new();
                self.run(OwnerRef::ProcessDocument(process_id), parent_id, file, &tracker)
                    .await
            }
        });
        let uploaded = try_join_all(uploads).await.map_err(|e| {
            tracing::warn!(%process_id, error = %e, "Process created but a document failed");
            e
        })?;

        tracing::info!(%process_id, documents = uploaded.len(), "Process created with documents");
        Ok((created, uploaded))
    }

    /// Remove the stored object (best effort), then clear the owner's record.
    pub async fn delete(
        &self,
        storage_path: &str,
        owner: OwnerRef,
    ) -> Result<DeleteOutcome, UploadError> {
        let storage_removed = match self.client.delete_file(storage_path).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    storage_path,
                    error = %e,
                    "Storage remove failed; clearing metadata anyway"
                );
                false
            }
        };

        self.clear_metadata(owner, storage_path).await?;
        Ok(DeleteOutcome { storage_removed })
    }

    /// Signed read URL for `storage_path`; the object's existence is not checked.
    pub async fn get_download_url(
        &self,
        storage_path: &str,
    ) -> Result<DownloadUrlResponse, UploadError> {
        self.client
            .download_url(storage_path)
            .await
            .map_err(UploadError::from)
    }
}
