use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields: process_id, filename, contentType";

/// Body of the credential-issuance endpoint.
///
/// Every field is optional on the wire so that the caller's identity is
/// checked before the body's completeness.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SignedUploadUrlRequest {
    /// Parent license process id
    #[serde(default)]
    pub process_id: Option<String>,
    /// Original filename as chosen by the user
    #[serde(default)]
    pub filename: Option<String>,
    /// MIME type the object will be stored with
    #[serde(default, rename = "contentType")]
    pub content_type: Option<String>,
}

/// A complete request for a write credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub parent_resource_id: String,
    pub filename: String,
    pub content_type: String,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<SignedUploadUrlRequest> for UploadRequest {
    type Error = AppError;

    fn try_from(body: SignedUploadUrlRequest) -> Result<Self, Self::Error> {
        match (
            present(body.process_id),
            present(body.filename),
            present(body.content_type),
        ) {
            (Some(parent_resource_id), Some(filename), Some(content_type)) => Ok(UploadRequest {
                parent_resource_id: parent_resource_id.trim().to_string(),
                filename,
                content_type,
            }),
            _ => Err(AppError::InvalidRequest(MISSING_FIELDS_MESSAGE.to_string())),
        }
    }
}

/// Time-boxed capability to write exactly one object
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WriteCredential {
    /// Signed URL accepting a single `PUT` of the file bytes
    pub upload_url: String,
    /// Key the object will be stored under
    pub storage_path: String,
    /// Opaque token identifying the upload
    pub file_id: String,
}

/// File description stored next to an uploaded object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub filename: String,
    pub file_size: u64,
    pub file_type: String,
    /// RFC 3339 instant, empty when cleared
    pub uploaded_at: String,
}

impl FileMetadata {
    pub fn new(filename: impl Into<String>, file_size: u64, file_type: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            file_size,
            file_type: file_type.into(),
            uploaded_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Everything recorded on the owning entity after a successful upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredFileMetadata {
    pub file_id: String,
    pub storage_path: String,
    pub metadata: FileMetadata,
}

impl StoredFileMetadata {
    /// Blank record used to clear a previous upload
    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn is_cleared(&self) -> bool {
        self.file_id.is_empty() && self.storage_path.is_empty() && self.metadata == FileMetadata::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadUrlRequest {
    pub storage_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadUrlResponse {
    pub url: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileRequest {
    pub storage_path: String,
}
