use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::collaborator::PermissionLevel;
use super::company::Company;
use crate::error::AppError;
use crate::validation::process::{expected_completion_date, non_blank};

/// Environmental license kind: preliminary (LP), installation (LI) or operating (LO)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum LicenseType {
    Lp,
    Li,
    Lo,
}

impl FromStr for LicenseType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LP" => Ok(LicenseType::Lp),
            "LI" => Ok(LicenseType::Li),
            "LO" => Ok(LicenseType::Lo),
            _ => Err(anyhow::anyhow!("Invalid license type: {}", s)),
        }
    }
}

impl Display for LicenseType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            LicenseType::Lp => write!(f, "LP"),
            LicenseType::Li => write!(f, "LI"),
            LicenseType::Lo => write!(f, "LO"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Submitted,
    EmAnalise,
    Aprovado,
    Rejeitado,
}

impl FromStr for ProcessStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(ProcessStatus::Submitted),
            "em_analise" => Ok(ProcessStatus::EmAnalise),
            "aprovado" => Ok(ProcessStatus::Aprovado),
            "rejeitado" => Ok(ProcessStatus::Rejeitado),
            _ => Err(anyhow::anyhow!("Invalid process status: {}", s)),
        }
    }
}

impl Display for ProcessStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ProcessStatus::Submitted => write!(f, "submitted"),
            ProcessStatus::EmAnalise => write!(f, "em_analise"),
            ProcessStatus::Aprovado => write!(f, "aprovado"),
            ProcessStatus::Rejeitado => write!(f, "rejeitado"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentalImpact {
    #[default]
    Baixo,
    Medio,
    Alto,
}

impl FromStr for EnvironmentalImpact {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "baixo" => Ok(EnvironmentalImpact::Baixo),
            "medio" => Ok(EnvironmentalImpact::Medio),
            "alto" => Ok(EnvironmentalImpact::Alto),
            _ => Err(anyhow::anyhow!("Invalid environmental impact: {}", s)),
        }
    }
}

impl Display for EnvironmentalImpact {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            EnvironmentalImpact::Baixo => write!(f, "baixo"),
            EnvironmentalImpact::Medio => write!(f, "medio"),
            EnvironmentalImpact::Alto => write!(f, "alto"),
        }
    }
}

/// An environmental-license request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LicenseProcess {
    pub id: Uuid,
    /// Owner; the only user allowed to modify the process
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub license_type: LicenseType,
    pub activity: String,
    pub municipality: String,
    pub project_description: String,
    pub status: ProcessStatus,
    pub progress: i32,
    pub submit_date: NaiveDate,
    pub expected_date: NaiveDate,
    pub location: String,
    pub area: Option<f64>,
    pub coordinates: Option<String>,
    pub environmental_impact: EnvironmentalImpact,
    pub estimated_value: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A process as listed for a user, with its company
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProcessWithCompany {
    #[serde(flatten)]
    pub process: LicenseProcess,
    pub company: Company,
    pub is_owner: bool,
    /// Set for processes the user collaborates on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_level: Option<PermissionLevel>,
}

impl ProcessWithCompany {
    /// Case-insensitive match against the company name or the activity
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.company.name.to_lowercase().contains(&term)
            || self.process.activity.to_lowercase().contains(&term)
    }
}

/// Typed payload for creating a process, validated once at the boundary
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "crate::validation::process::validate_company_reference"))]
pub struct NewProcessInput {
    pub license_type: LicenseType,
    /// Existing company; when absent a new company is created from the fields below
    #[serde(default)]
    pub company_id: Option<Uuid>,
    /// Legal name of the new company
    #[serde(default)]
    pub company: Option<String>,
    #[validate(custom(function = "non_blank", message = "CNPJ é obrigatório."))]
    pub cnpj: String,
    #[serde(default)]
    #[validate(email(message = "Email inválido."))]
    pub email: Option<String>,
    #[validate(custom(function = "non_blank", message = "Atividade é obrigatória."))]
    pub activity: String,
    #[validate(custom(function = "non_blank", message = "Endereço completo é obrigatório."))]
    pub location: String,
    #[validate(custom(function = "non_blank", message = "Estado é obrigatório."))]
    pub state: String,
    #[validate(custom(function = "non_blank", message = "Município é obrigatório."))]
    pub city: String,
    #[validate(custom(function = "non_blank", message = "Descrição detalhada é obrigatória."))]
    pub description: String,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Valor estimado não pode ser negativo."))]
    pub estimated_value: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Área não pode ser negativa."))]
    pub area: Option<f64>,
    #[serde(default)]
    pub coordinates: Option<String>,
    #[serde(default)]
    pub environmental_impact: EnvironmentalImpact,
}

/// Process row to insert
#[derive(Debug, Clone)]
pub struct NewLicenseProcess {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub license_type: LicenseType,
    pub activity: String,
    pub municipality: String,
    pub project_description: String,
    pub status: ProcessStatus,
    pub progress: i32,
    pub submit_date: NaiveDate,
    pub expected_date: NaiveDate,
    pub location: String,
    pub area: Option<f64>,
    pub coordinates: Option<String>,
    pub environmental_impact: EnvironmentalImpact,
    pub estimated_value: Option<f64>,
}

impl NewLicenseProcess {
    /// A freshly submitted process: status `submitted`, no progress yet.
    pub fn submitted(
        user_id: Uuid,
        company_id: Uuid,
        input: &NewProcessInput,
        today: NaiveDate,
    ) -> Self {
        Self {
            user_id,
            company_id,
            license_type: input.license_type,
            activity: input.activity.trim().to_string(),
            municipality: input.city.trim().to_string(),
            project_description: input.description.trim().to_string(),
            status: ProcessStatus::Submitted,
            progress: 0,
            submit_date: today,
            expected_date: expected_completion_date(input.license_type, today),
            location: input.location.trim().to_string(),
            area: input.area,
            coordinates: input
                .coordinates
                .clone()
                .filter(|c| !c.trim().is_empty()),
            environmental_impact: input.environmental_impact,
            estimated_value: input.estimated_value,
        }
    }
}

/// Partial update applied by the process owner
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProcessUpdate {
    pub activity: Option<String>,
    pub project_description: Option<String>,
    pub status: Option<ProcessStatus>,
    #[validate(range(min = 0, max = 100, message = "Progresso deve estar entre 0 e 100."))]
    pub progress: Option<i32>,
    pub location: Option<String>,
    pub area: Option<f64>,
    pub coordinates: Option<String>,
    pub environmental_impact: Option<EnvironmentalImpact>,
    pub estimated_value: Option<f64>,
    pub expected_date: Option<NaiveDate>,
}

impl ProcessUpdate {
    pub fn is_empty(&self) -> bool {
        self.activity.is_none()
            && self.project_description.is_none()
            && self.status.is_none()
            && self.progress.is_none()
            && self.location.is_none()
            && self.area.is_none()
            && self.coordinates.is_none()
            && self.environmental_impact.is_none()
            && self.estimated_value.is_none()
            && self.expected_date.is_none()
    }

    /// Apply the present fields to `process`
    pub fn apply_to(&self, process: &mut LicenseProcess) {
        if let Some(ref activity) = self.activity {
            process.activity = activity.clone();
        }
        if let Some(ref description) = self.project_description {
            process.project_description = description.clone();
        }
        if let Some(status) = self.status {
            process.status = status;
        }
        if let Some(progress) = self.progress {
            process.progress = progress;
        }
        if let Some(ref location) = self.location {
            process.location = location.clone();
        }
        if self.area.is_some() {
            process.area = self.area;
        }
        if self.coordinates.is_some() {
            process.coordinates = self.coordinates.clone();
        }
        if let Some(impact) = self.environmental_impact {
            process.environmental_impact = impact;
        }
        if self.estimated_value.is_some() {
            process.estimated_value = self.estimated_value;
        }
        if let Some(date) = self.expected_date {
            process.expected_date = date;
        }
    }
}

/// Query filters for listing processes
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProcessFilters {
    /// Status to match; `all` disables the filter
    pub status: Option<String>,
    pub license_type: Option<LicenseType>,
    /// Matched against company name or activity
    pub search: Option<String>,
}

impl ProcessFilters {
    pub fn status_filter(&self) -> Result<Option<ProcessStatus>, AppError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| AppError::InvalidRequest(format!("Invalid status filter: {}", raw))),
        }
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Per-status counts over the caller's own processes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProcessStats {
    pub total: u64,
    pub pending: u64,
    pub analysis: u64,
    pub approved: u64,
    pub rejected: u64,
    /// Expiry is not tracked yet; always zero
    pub expired: u64,
}

impl ProcessStats {
    pub fn from_statuses<I: IntoIterator<Item = ProcessStatus>>(statuses: I) -> Self {
        let mut stats = ProcessStats::default();
        for status in statuses {
            stats.total += 1;
            match status {
                ProcessStatus::Submitted => stats.pending += 1,
                ProcessStatus::EmAnalise => stats.analysis += 1,
                ProcessStatus::Aprovado => stats.approved += 1,
                ProcessStatus::Rejeitado => stats.rejected += 1,
            }
        }
        stats
    }
}
