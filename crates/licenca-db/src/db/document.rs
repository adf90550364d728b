use async_trait::async_trait;
use chrono::{DateTime, Utc};
use licenca_core::models::{NewProcessDocument, ProcessDocument};
use licenca_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use super::traits::DocumentStore;

const DOCUMENT_COLUMNS: &str =
    "id, process_id, name, file_path, file_size, file_type, uploaded_by, uploaded_at";

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    process_id: Uuid,
    name: String,
    file_path: String,
    file_size: i64,
    file_type: String,
    uploaded_by: Uuid,
    uploaded_at: DateTime<Utc>,
}

impl From<DocumentRow> for ProcessDocument {
    fn from(row: DocumentRow) -> Self {
        ProcessDocument {
            id: row.id,
            process_id: row.process_id,
            name: row.name,
            file_path: row.file_path,
            file_size: row.file_size,
            file_type: row.file_type,
            uploaded_by: row.uploaded_by,
            uploaded_at: row.uploaded_at,
        }
    }
}

/// Repository for documents attached to license processes
#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    #[tracing::instrument(skip(self), fields(db.table = "process_documents", db.operation = "select"))]
    async fn list_documents(&self, process_id: Uuid) -> Result<Vec<ProcessDocument>, AppError> {
        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {} FROM process_documents WHERE process_id = $1 ORDER BY uploaded_at DESC",
            DOCUMENT_COLUMNS
        ))
        .bind(process_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProcessDocument::from).collect())
    }

    #[tracing::instrument(skip(self, document), fields(db.table = "process_documents", db.operation = "insert"))]
    async fn record_document(
        &self,
        document: NewProcessDocument,
    ) -> Result<ProcessDocument, AppError> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            r#"
            INSERT INTO process_documents (process_id, name, file_path, file_size, file_type, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (process_id, file_path) DO UPDATE SET
                name = EXCLUDED.name,
                file_size = EXCLUDED.file_size,
                file_type = EXCLUDED.file_type,
                uploaded_by = EXCLUDED.uploaded_by,
                uploaded_at = NOW()
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        ))
        .bind(document.process_id)
        .bind(&document.name)
        .bind(&document.file_path)
        .bind(document.file_size)
        .bind(&document.file_type)
        .bind(document.uploaded_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    #[tracing::instrument(skip(self), fields(db.table = "process_documents", db.operation = "delete"))]
    async fn remove_document(&self, process_id: Uuid, file_path: &str) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM process_documents WHERE process_id = $1 AND file_path = $2")
                .bind(process_id)
                .bind(file_path)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
