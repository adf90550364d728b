use async_trait::async_trait;
use chrono::{DateTime, Utc};
use licenca_core::models::{Company, NewCompany};
use licenca_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use super::traits::CompanyStore;

const COMPANY_COLUMNS: &str =
    "id, user_id, name, cnpj, email, city, state, address, created_at";

/// Row type for companies table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
struct CompanyRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    cnpj: String,
    email: String,
    city: String,
    state: String,
    address: String,
    created_at: DateTime<Utc>,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Company {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            cnpj: row.cnpj,
            email: row.email,
            city: row.city,
            state: row.state,
            address: row.address,
            created_at: row.created_at,
        }
    }
}

/// Repository for companies
#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyStore for CompanyRepository {
    #[tracing::instrument(skip(self), fields(db.table = "companies", db.operation = "select", db.record_id = %id))]
    async fn find_company(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        let row = sqlx::query_as::<_, CompanyRow>(&format!(
            "SELECT {} FROM companies WHERE id = $1",
            COMPANY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Company::from))
    }

    #[tracing::instrument(skip(self, company), fields(db.table = "companies", db.operation = "insert"))]
    async fn create_company(&self, company: NewCompany) -> Result<Company, AppError> {
        let row = sqlx::query_as::<_, CompanyRow>(&format!(
            r#"
            INSERT INTO companies (user_id, name, cnpj, email, city, state, address)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            COMPANY_COLUMNS
        ))
        .bind(company.user_id)
        .bind(&company.name)
        .bind(&company.cnpj)
        .bind(&company.email)
        .bind(&company.city)
        .bind(&company.state)
        .bind(&company.address)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(company_id = %row.id, user_id = %row.user_id, "Company created");

        Ok(row.into())
    }
}
