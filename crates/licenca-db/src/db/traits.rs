//! Store trait abstractions
//!
//! These traits define the interface the API needs from persistence, so
//! services can run against Postgres in production and in-memory stores in
//! tests.

use async_trait::async_trait;
use licenca_core::models::{
    Company, LicenseProcess, NewCompany, NewLicenseProcess, NewProcessDocument,
    ProcessCollaborator, ProcessDocument, ProcessStatus, ProcessUpdate, ProcessWithCompany,
    StoredFileMetadata,
};
use licenca_core::AppError;
use uuid::Uuid;

#[async_trait]
pub trait ProcessStore: Send + Sync {
    /// Get a process by ID, regardless of owner
    async fn find_process(&self, id: Uuid) -> Result<Option<LicenseProcess>, AppError>;

    /// Get a process together with its company
    async fn find_with_company(
        &self,
        id: Uuid,
    ) -> Result<Option<(LicenseProcess, Company)>, AppError>;

    /// Processes owned by `user_id`, newest first
    async fn list_owned(&self, user_id: Uuid) -> Result<Vec<ProcessWithCompany>, AppError>;

    /// Processes where `user_id` is an accepted collaborator, newest first
    async fn list_shared_with(&self, user_id: Uuid)
        -> Result<Vec<ProcessWithCompany>, AppError>;

    async fn create_process(&self, process: NewLicenseProcess)
        -> Result<LicenseProcess, AppError>;

    /// Apply the set fields of `update`; `None` when the process is gone
    async fn update_process(
        &self,
        id: Uuid,
        update: &ProcessUpdate,
    ) -> Result<Option<LicenseProcess>, AppError>;

    /// Returns whether a row was deleted
    async fn delete_process(&self, id: Uuid) -> Result<bool, AppError>;

    /// Status of every process owned by `user_id`
    async fn owned_statuses(&self, user_id: Uuid) -> Result<Vec<ProcessStatus>, AppError>;
}

#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn find_company(&self, id: Uuid) -> Result<Option<Company>, AppError>;

    async fn create_company(&self, company: NewCompany) -> Result<Company, AppError>;
}

#[async_trait]
pub trait CollaboratorStore: Send + Sync {
    async fn find_collaborator(&self, id: Uuid) -> Result<Option<ProcessCollaborator>, AppError>;

    /// The accepted collaboration of `user_id` on `process_id`, if any
    async fn find_membership(
        &self,
        process_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProcessCollaborator>, AppError>;

    /// Overwrite the procuration fields; `None` when the collaborator is gone
    async fn set_procuration(
        &self,
        id: Uuid,
        stored: &StoredFileMetadata,
    ) -> Result<Option<ProcessCollaborator>, AppError>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents of a process, newest first
    async fn list_documents(&self, process_id: Uuid) -> Result<Vec<ProcessDocument>, AppError>;

    /// Insert a document row, replacing an existing row for the same path
    async fn record_document(
        &self,
        document: NewProcessDocument,
    ) -> Result<ProcessDocument, AppError>;

    /// Returns whether a row was deleted
    async fn remove_document(&self, process_id: Uuid, file_path: &str)
        -> Result<bool, AppError>;
}
