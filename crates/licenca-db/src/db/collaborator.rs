use async_trait::async_trait;
use chrono::{DateTime, Utc};
use licenca_core::models::{FileMetadata, ProcessCollaborator, StoredFileMetadata};
use licenca_core::AppError;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::traits::CollaboratorStore;

const COLLABORATOR_COLUMNS: &str = r#"
    id, process_id, user_id, email, permission_level, status,
    procuracao_file_id, procuracao_storage_path, procuracao_file_metadata, created_at
"#;

/// Row type for process_collaborators table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
struct CollaboratorRow {
    id: Uuid,
    process_id: Uuid,
    user_id: Option<Uuid>,
    email: String,
    permission_level: String,
    status: String,
    procuracao_file_id: Option<String>,
    procuracao_storage_path: Option<String>,
    procuracao_file_metadata: Option<Json<FileMetadata>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CollaboratorRow> for ProcessCollaborator {
    type Error = AppError;

    fn try_from(row: CollaboratorRow) -> Result<Self, Self::Error> {
        Ok(ProcessCollaborator {
            id: row.id,
            process_id: row.process_id,
            user_id: row.user_id,
            email: row.email,
            permission_level: row.permission_level.parse()?,
            status: row.status.parse()?,
            procuracao_file_id: row.procuracao_file_id,
            procuracao_storage_path: row.procuracao_storage_path,
            procuracao_file_metadata: row.procuracao_file_metadata.map(|Json(m)| m),
            created_at: row.created_at,
        })
    }
}

/// Repository for process collaborators and their procuration files
#[derive(Clone)]
pub struct CollaboratorRepository {
    pool: PgPool,
}

impl CollaboratorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CollaboratorStore for CollaboratorRepository {
    #[tracing::instrument(skip(self), fields(db.table = "process_collaborators", db.operation = "select", db.record_id = %id))]
    async fn find_collaborator(&self, id: Uuid) -> Result<Option<ProcessCollaborator>, AppError> {
        let row = sqlx::query_as::<_, CollaboratorRow>(&format!(
            "SELECT {} FROM process_collaborators WHERE id = $1",
            COLLABORATOR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProcessCollaborator::try_from).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "process_collaborators", db.operation = "select"))]
    async fn find_membership(
        &self,
        process_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProcessCollaborator>, AppError> {
        let row = sqlx::query_as::<_, CollaboratorRow>(&format!(
            r#"
            SELECT {} FROM process_collaborators
            WHERE process_id = $1 AND user_id = $2 AND status = 'accepted'
            LIMIT 1
            "#,
            COLLABORATOR_COLUMNS
        ))
        .bind(process_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProcessCollaborator::try_from).transpose()
    }

    #[tracing::instrument(skip(self, stored), fields(db.table = "process_collaborators", db.operation = "update", db.record_id = %id))]
    async fn set_procuration(
        &self,
        id: Uuid,
        stored: &StoredFileMetadata,
    ) -> Result<Option<ProcessCollaborator>, AppError> {
        let row = sqlx::query_as::<_, CollaboratorRow>(&format!(
            r#"
            UPDATE process_collaborators SET
                procuracao_file_id = $2,
                procuracao_storage_path = $3,
                procuracao_file_metadata = $4
            WHERE id = $1
            RETURNING {}
            "#,
            COLLABORATOR_COLUMNS
        ))
        .bind(id)
        .bind(&stored.file_id)
        .bind(&stored.storage_path)
        .bind(Json(&stored.metadata))
        .fetch_optional(&self.pool)
        .await?;

        if row.is_some() {
            tracing::info!(
                collaborator_id = %id,
                storage_path = %stored.storage_path,
                cleared = stored.is_cleared(),
                "Procuration updated"
            );
        }

        row.map(ProcessCollaborator::try_from).transpose()
    }
}
