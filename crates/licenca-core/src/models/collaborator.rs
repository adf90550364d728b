use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use super::upload::{FileMetadata, StoredFileMetadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    Viewer,
    Editor,
    Admin,
}

impl FromStr for PermissionLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(PermissionLevel::Viewer),
            "editor" => Ok(PermissionLevel::Editor),
            "admin" => Ok(PermissionLevel::Admin),
            _ => Err(anyhow::anyhow!("Invalid permission level: {}", s)),
        }
    }
}

impl Display for PermissionLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PermissionLevel::Viewer => write!(f, "viewer"),
            PermissionLevel::Editor => write!(f, "editor"),
            PermissionLevel::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CollaboratorStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FromStr for CollaboratorStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CollaboratorStatus::Pending),
            "accepted" => Ok(CollaboratorStatus::Accepted),
            "rejected" => Ok(CollaboratorStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid collaborator status: {}", s)),
        }
    }
}

impl Display for CollaboratorStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CollaboratorStatus::Pending => write!(f, "pending"),
            CollaboratorStatus::Accepted => write!(f, "accepted"),
            CollaboratorStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// A user invited to work on someone else's process.
///
/// The procuration (power of attorney) fields hold the collaborator's
/// uploaded document; they are blanked rather than nulled when the file is
/// deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProcessCollaborator {
    pub id: Uuid,
    pub process_id: Uuid,
    pub user_id: Option<Uuid>,
    pub email: String,
    pub permission_level: PermissionLevel,
    pub status: CollaboratorStatus,
    pub procuracao_file_id: Option<String>,
    pub procuracao_storage_path: Option<String>,
    pub procuracao_file_metadata: Option<FileMetadata>,
    pub created_at: DateTime<Utc>,
}

impl ProcessCollaborator {
    /// Current procuration record, if one was ever written
    pub fn procuration(&self) -> Option<StoredFileMetadata> {
        if self.procuracao_file_id.is_none()
            && self.procuracao_storage_path.is_none()
            && self.procuracao_file_metadata.is_none()
        {
            return None;
        }
        Some(StoredFileMetadata {
            file_id: self.procuracao_file_id.clone().unwrap_or_default(),
            storage_path: self.procuracao_storage_path.clone().unwrap_or_default(),
            metadata: self.procuracao_file_metadata.clone().unwrap_or_default(),
        })
    }

    /// Overwrite the procuration fields with `stored`
    pub fn apply_procuration(&mut self, stored: &StoredFileMetadata) {
        self.procuracao_file_id = Some(stored.file_id.clone());
        self.procuracao_storage_path = Some(stored.storage_path.clone());
        self.procuracao_file_metadata = Some(stored.metadata.clone());
    }
}
