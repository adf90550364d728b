//! Domain models
//!
//! Request/response DTOs and entities for license processes, companies,
//! collaborators, documents, and the signed-upload flow.

pub mod collaborator;
pub mod company;
pub mod document;
pub mod process;
pub mod upload;

pub use collaborator::{CollaboratorStatus, PermissionLevel, ProcessCollaborator};
pub use company::{Company, NewCompany};
pub use document::{NewProcessDocument, ProcessDocument, RecordDocumentRequest};
pub use process::{
    EnvironmentalImpact, LicenseProcess, LicenseType, NewLicenseProcess, NewProcessInput,
    ProcessFilters, ProcessStats, ProcessStatus, ProcessUpdate, ProcessWithCompany,
};
pub use upload::{
    DeleteFileRequest, DownloadUrlRequest, DownloadUrlResponse, FileMetadata,
    SignedUploadUrlRequest, StoredFileMetadata, UploadRequest, WriteCredential,
};
