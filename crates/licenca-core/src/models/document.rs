use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Supporting document attached to a license process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProcessDocument {
    pub id: Uuid,
    pub process_id: Uuid,
    pub name: String,
    pub file_path: String,
    pub file_size: i64,
    pub file_type: String,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProcessDocument {
    pub process_id: Uuid,
    pub name: String,
    pub file_path: String,
    pub file_size: i64,
    pub file_type: String,
    pub uploaded_by: Uuid,
}

/// Body recording an uploaded document against its process
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordDocumentRequest {
    pub storage_path: String,
    pub filename: String,
    pub file_size: u64,
    pub file_type: String,
}
