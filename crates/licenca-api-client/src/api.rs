//! Domain methods for the Licenca API client.
//!
//! Request and response types come from `licenca_core::models`.

use crate::{ApiClient, ApiError, API_PREFIX};
use licenca_core::models::{
    DeleteFileRequest, DownloadUrlRequest, DownloadUrlResponse, LicenseProcess, LicenseType,
    NewProcessInput, ProcessCollaborator, ProcessDocument, ProcessStats, ProcessUpdate,
    ProcessWithCompany, RecordDocumentRequest, SignedUploadUrlRequest, StoredFileMetadata,
    WriteCredential,
};
use reqwest::Method;
use uuid::Uuid;

/// Query for [`ApiClient::list_processes`]
#[derive(Debug, Clone, Default)]
pub struct ProcessQuery {
    pub status: Option<String>,
    pub license_type: Option<LicenseType>,
    pub search: Option<String>,
}

impl ProcessQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(status) = &self.status {
            query.push(("status", status.clone()));
        }
        if let Some(license_type) = self.license_type {
            query.push(("licenseType", license_type.to_string()));
        }
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        query
    }
}

impl ApiClient {
    /// Ask the broker for a write credential under `process_id`.
    pub async fn signed_upload_url(
        &self,
        process_id: &str,
        filename: &str,
        content_type: &str,
    ) -> Result<WriteCredential, ApiError> {
        let body = SignedUploadUrlRequest {
            process_id: Some(process_id.to_string()),
            filename: Some(filename.to_string()),
            content_type: Some(content_type.to_string()),
        };
        self.send_json(
            Method::POST,
            &format!("{}/uploads/signed-url", API_PREFIX),
            &body,
        )
        .await
    }

    pub async fn download_url(&self, storage_path: &str) -> Result<DownloadUrlResponse, ApiError> {
        let body = DownloadUrlRequest {
            storage_path: storage_path.to_string(),
        };
        self.send_json(
            Method::POST,
            &format!("{}/files/download-url", API_PREFIX),
            &body,
        )
        .await
    }

    pub async fn delete_file(&self, storage_path: &str) -> Result<(), ApiError> {
        let body = DeleteFileRequest {
            storage_path: storage_path.to_string(),
        };
        self.send_empty(Method::DELETE, &format!("{}/files", API_PREFIX), &[], Some(&body))
            .await
    }

    /// Overwrite (or clear, with [`StoredFileMetadata::cleared`]) a procuration.
    pub async fn set_procuration(
        &self,
        collaborator_id: Uuid,
        stored: &StoredFileMetadata,
    ) -> Result<ProcessCollaborator, ApiError> {
        self.send_json(
            Method::PUT,
            &format!("{}/collaborators/{}/procuration", API_PREFIX, collaborator_id),
            stored,
        )
        .await
    }

    pub async fn list_documents(&self, process_id: Uuid) -> Result<Vec<ProcessDocument>, ApiError> {
        self.get(
            &format!("{}/processes/{}/documents", API_PREFIX, process_id),
            &[],
        )
        .await
    }

    pub async fn record_document(
        &self,
        process_id: Uuid,
        request: &RecordDocumentRequest,
    ) -> Result<ProcessDocument, ApiError> {
        self.send_json(
            Method::POST,
            &format!("{}/processes/{}/documents", API_PREFIX, process_id),
            request,
        )
        .await
    }

    pub async fn remove_document(&self, process_id: Uuid, storage_path: &str) -> Result<(), ApiError> {
        self.send_empty(
            Method::DELETE,
            &format!("{}/processes/{}/documents", API_PREFIX, process_id),
            &[("path", storage_path.to_string())],
            None::<&()>,
        )
        .await
    }

    pub async fn list_processes(
        &self,
        query: &ProcessQuery,
    ) -> Result<Vec<ProcessWithCompany>, ApiError> {
        self.get(&format!("{}/processes", API_PREFIX), &query.pairs())
            .await
    }

    pub async fn get_process(&self, id: Uuid) -> Result<ProcessWithCompany, ApiError> {
        self.get(&format!("{}/processes/{}", API_PREFIX, id), &[])
            .await
    }

    pub async fn create_process(
        &self,
        input: &NewProcessInput,
    ) -> Result<ProcessWithCompany, ApiError> {
        self.send_json(Method::POST, &format!("{}/processes", API_PREFIX), input)
            .await
    }

    pub async fn update_process(
        &self,
        id: Uuid,
        update: &ProcessUpdate,
    ) -> Result<LicenseProcess, ApiError> {
        self.send_json(
            Method::PATCH,
            &format!("{}/processes/{}", API_PREFIX, id),
            update,
        )
        .await
    }

    pub async fn delete_process(&self, id: Uuid) -> Result<(), ApiError> {
        self.send_empty(
            Method::DELETE,
            &format!("{}/processes/{}", API_PREFIX, id),
            &[],
            None::<&()>,
        )
        .await
    }

    pub async fn process_stats(&self) -> Result<ProcessStats, ApiError> {
        self.get(&format!("{}/processes/stats", API_PREFIX), &[])
            .await
    }
}
