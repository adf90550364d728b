use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Company applying for a license
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Company {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub cnpj: String,
    pub email: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

/// Company row to insert
#[derive(Debug, Clone)]
pub struct NewCompany {
    pub user_id: Uuid,
    pub name: String,
    pub cnpj: String,
    pub email: String,
    pub city: String,
    pub state: String,
    pub address: String,
}
