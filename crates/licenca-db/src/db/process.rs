use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use licenca_core::models::{
    Company, LicenseProcess, NewLicenseProcess, PermissionLevel, ProcessStatus, ProcessUpdate,
    ProcessWithCompany,
};
use licenca_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use super::traits::ProcessStore;

const PROCESS_COLUMNS: &str = r#"
    p.id, p.user_id, p.company_id, p.license_type, p.activity, p.municipality,
    p.project_description, p.status, p.progress, p.submit_date, p.expected_date,
    p.location, p.area, p.coordinates, p.environmental_impact, p.estimated_value,
    p.created_at, p.updated_at
"#;

const JOINED_COMPANY_COLUMNS: &str = r#"
    c.id AS c_id, c.user_id AS c_user_id, c.name AS c_name, c.cnpj AS c_cnpj,
    c.email AS c_email, c.city AS c_city, c.state AS c_state, c.address AS c_address,
    c.created_at AS c_created_at
"#;

/// Row type for license_processes table (for FromRow).
/// Enum columns are stored as text and parsed on the way out.
#[derive(Debug, sqlx::FromRow)]
struct ProcessRow {
    id: Uuid,
    user_id: Uuid,
    company_id: Uuid,
    license_type: String,
    activity: String,
    municipality: String,
    project_description: String,
    status: String,
    progress: i32,
    submit_date: NaiveDate,
    expected_date: NaiveDate,
    location: String,
    area: Option<f64>,
    coordinates: Option<String>,
    environmental_impact: String,
    estimated_value: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProcessRow> for LicenseProcess {
    type Error = AppError;

    fn try_from(row: ProcessRow) -> Result<Self, Self::Error> {
        Ok(LicenseProcess {
            id: row.id,
            user_id: row.user_id,
            company_id: row.company_id,
            license_type: row.license_type.parse()?,
            activity: row.activity,
            municipality: row.municipality,
            project_description: row.project_description,
            status: row.status.parse()?,
            progress: row.progress,
            submit_date: row.submit_date,
            expected_date: row.expected_date,
            location: row.location,
            area: row.area,
            coordinates: row.coordinates,
            environmental_impact: row.environmental_impact.parse()?,
            estimated_value: row.estimated_value,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProcessCompanyRow {
    #[sqlx(flatten)]
    process: ProcessRow,
    c_id: Uuid,
    c_user_id: Uuid,
    c_name: String,
    c_cnpj: String,
    c_email: String,
    c_city: String,
    c_state: String,
    c_address: String,
    c_created_at: DateTime<Utc>,
    #[sqlx(default)]
    permission_level: Option<String>,
}

impl ProcessCompanyRow {
    fn into_parts(self) -> Result<(LicenseProcess, Company, Option<String>), AppError> {
        let company = Company {
            id: self.c_id,
            user_id: self.c_user_id,
            name: self.c_name,
            cnpj: self.c_cnpj,
            email: self.c_email,
            city: self.c_city,
            state: self.c_state,
            address: self.c_address,
            created_at: self.c_created_at,
        };
        Ok((self.process.try_into()?, company, self.permission_level))
    }
}

/// Repository for license processes
#[derive(Clone)]
pub struct ProcessRepository {
    pool: PgPool,
}

impl ProcessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcessStore for ProcessRepository {
    #[tracing::instrument(skip(self), fields(db.table = "license_processes", db.operation = "select", db.record_id = %id))]
    async fn find_process(&self, id: Uuid) -> Result<Option<LicenseProcess>, AppError> {
        let row = sqlx::query_as::<_, ProcessRow>(&format!(
            "SELECT {} FROM license_processes p WHERE p.id = $1",
            PROCESS_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(LicenseProcess::try_from).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "license_processes", db.operation = "select", db.record_id = %id))]
    async fn find_with_company(
        &self,
        id: Uuid,
    ) -> Result<Option<(LicenseProcess, Company)>, AppError> {
        let row = sqlx::query_as::<_, ProcessCompanyRow>(&format!(
            r#"
            SELECT {}, {}
            FROM license_processes p
            JOIN companies c ON c.id = p.company_id
            WHERE p.id = $1
            "#,
            PROCESS_COLUMNS, JOINED_COMPANY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let (process, company, _) = row.into_parts()?;
                Ok(Some((process, company)))
            }
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "license_processes", db.operation = "select"))]
    async fn list_owned(&self, user_id: Uuid) -> Result<Vec<ProcessWithCompany>, AppError> {
        let rows = sqlx::query_as::<_, ProcessCompanyRow>(&format!(
            r#"
            SELECT {}, {}
            FROM license_processes p
            JOIN companies c ON c.id = p.company_id
            WHERE p.user_id = $1
            ORDER BY p.created_at DESC
            "#,
            PROCESS_COLUMNS, JOINED_COMPANY_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let (process, company, _) = row.into_parts()?;
                Ok(ProcessWithCompany {
                    process,
                    company,
                    is_owner: true,
                    permission_level: None,
                })
            })
            .collect()
    }

    #[tracing::instrument(skip(self), fields(db.table = "process_collaborators", db.operation = "select"))]
    async fn list_shared_with(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ProcessWithCompany>, AppError> {
        let rows = sqlx::query_as::<_, ProcessCompanyRow>(&format!(
            r#"
            SELECT {}, {}, pc.permission_level
            FROM process_collaborators pc
            JOIN license_processes p ON p.id = pc.process_id
            JOIN companies c ON c.id = p.company_id
            WHERE pc.user_id = $1 AND pc.status = 'accepted'
            ORDER BY p.created_at DESC
            "#,
            PROCESS_COLUMNS, JOINED_COMPANY_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let (process, company, level) = row.into_parts()?;
                let permission_level = level
                    .map(|l| l.parse::<PermissionLevel>())
                    .transpose()?;
                Ok(ProcessWithCompany {
                    process,
                    company,
                    is_owner: false,
                    permission_level,
                })
            })
            .collect()
    }

    #[tracing::instrument(skip(self, process), fields(db.table = "license_processes", db.operation = "insert"))]
    async fn create_process(
        &self,
        process: NewLicenseProcess,
    ) -> Result<LicenseProcess, AppError> {
        let row = sqlx::query_as::<_, ProcessRow>(&format!(
            r#"
            INSERT INTO license_processes AS p (
                user_id, company_id, license_type, activity, municipality,
                project_description, status, progress, submit_date, expected_date,
                location, area, coordinates, environmental_impact, estimated_value
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {}
            "#,
            PROCESS_COLUMNS
        ))
        .bind(process.user_id)
        .bind(process.company_id)
        .bind(process.license_type.to_string())
        .bind(&process.activity)
        .bind(&process.municipality)
        .bind(&process.project_description)
        .bind(process.status.to_string())
        .bind(process.progress)
        .bind(process.submit_date)
        .bind(process.expected_date)
        .bind(&process.location)
        .bind(process.area)
        .bind(&process.coordinates)
        .bind(process.environmental_impact.to_string())
        .bind(process.estimated_value)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(process_id = %row.id, user_id = %row.user_id, "License process created");

        row.try_into()
    }

    #[tracing::instrument(skip(self, update), fields(db.table = "license_processes", db.operation = "update", db.record_id = %id))]
    async fn update_process(
        &self,
        id: Uuid,
        update: &ProcessUpdate,
    ) -> Result<Option<LicenseProcess>, AppError> {
        let row = sqlx::query_as::<_, ProcessRow>(&format!(
            r#"
            UPDATE license_processes AS p SET
                activity = COALESCE($2, p.activity),
                project_description = COALESCE($3, p.project_description),
                status = COALESCE($4, p.status),
                progress = COALESCE($5, p.progress),
                location = COALESCE($6, p.location),
                area = COALESCE($7, p.area),
                coordinates = COALESCE($8, p.coordinates),
                environmental_impact = COALESCE($9, p.environmental_impact),
                estimated_value = COALESCE($10, p.estimated_value),
                expected_date = COALESCE($11, p.expected_date),
                updated_at = NOW()
            WHERE p.id = $1
            RETURNING {}
            "#,
            PROCESS_COLUMNS
        ))
        .bind(id)
        .bind(&update.activity)
        .bind(&update.project_description)
        .bind(update.status.map(|s| s.to_string()))
        .bind(update.progress)
        .bind(&update.location)
        .bind(update.area)
        .bind(&update.coordinates)
        .bind(update.environmental_impact.map(|i| i.to_string()))
        .bind(update.estimated_value)
        .bind(update.expected_date)
        .fetch_optional(&self.pool)
        .await?;

        row.map(LicenseProcess::try_from).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "license_processes", db.operation = "delete", db.record_id = %id))]
    async fn delete_process(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM license_processes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "license_processes", db.operation = "select"))]
    async fn owned_statuses(&self, user_id: Uuid) -> Result<Vec<ProcessStatus>, AppError> {
        let statuses: Vec<String> =
            sqlx::query_scalar("SELECT status FROM license_processes WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        statuses
            .iter()
            .map(|s| s.parse::<ProcessStatus>().map_err(AppError::from))
            .collect()
    }
}
