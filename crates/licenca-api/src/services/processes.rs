use crate::auth::models::Identity;
use crate::services::access::{owned_process, PROCESS_NOT_FOUND};
use chrono::Utc;
use licenca_core::models::{
    LicenseProcess, NewCompany, NewLicenseProcess, NewProcessInput, ProcessFilters, ProcessStats,
    ProcessUpdate, ProcessWithCompany,
};
use licenca_core::AppError;
use licenca_db::{CompanyStore, ProcessStore};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

const MODIFY_FORBIDDEN: &str = "Only the process owner can modify this process";

/// License process CRUD scoped to the calling user
#[derive(Clone)]
pub struct ProcessService {
    processes: Arc<dyn ProcessStore>,
    companies: Arc<dyn CompanyStore>,
}

impl ProcessService {
    pub fn new(processes: Arc<dyn ProcessStore>, companies: Arc<dyn CompanyStore>) -> Self {
        Self {
            processes,
            companies,
        }
    }

    /// Owned processes plus those shared through an accepted invitation,
    /// newest first. A process appearing in both lists is reported as owned.
    pub async fn list(
        &self,
        identity: &Identity,
        filters: &ProcessFilters,
    ) -> Result<Vec<ProcessWithCompany>, AppError> {
        let status = filters.status_filter()?;
        let search = filters.search_term();

        let owned = self.processes.list_owned(identity.user_id).await?;
        let shared = self.processes.list_shared_with(identity.user_id).await?;

        let mut seen = HashSet::new();
        let mut all: Vec<ProcessWithCompany> = owned
            .into_iter()
            .chain(shared)
            .filter(|p| seen.insert(p.process.id))
            .filter(|p| status.is_none_or(|s| p.process.status == s))
            .filter(|p| {
                filters
                    .license_type
                    .is_none_or(|t| p.process.license_type == t)
            })
            .filter(|p| search.is_none_or(|term| p.matches_search(term)))
            .collect();

        all.sort_by(|a, b| b.process.created_at.cmp(&a.process.created_at));
        Ok(all)
    }

    /// A process with its company; only the owner can see it this way.
    pub async fn get(&self, identity: &Identity, id: Uuid) -> Result<ProcessWithCompany, AppError> {
        match self.processes.find_with_company(id).await? {
            Some((process, company)) if process.user_id == identity.user_id => {
                Ok(ProcessWithCompany {
                    process,
                    company,
                    is_owner: true,
                    permission_level: None,
                })
            }
            _ => Err(AppError::NotFound(PROCESS_NOT_FOUND.to_string())),
        }
    }

    /// Submit a new process, creating its company unless an existing one is referenced.
    #[tracing::instrument(skip(self, identity, input), fields(user_id = %identity.user_id))]
    pub async fn create(
        &self,
        identity: &Identity,
        input: NewProcessInput,
    ) -> Result<ProcessWithCompany, AppError> {
        input.validate()?;

        let company = match input.company_id {
            Some(company_id) => self
                .companies
                .find_company(company_id)
                .await?
                .filter(|c| c.user_id == identity.user_id)
                .ok_or_else(|| AppError::NotFound("Company not found".to_string()))?,
            None => {
                let email = input
                    .email
                    .clone()
                    .filter(|e| !e.trim().is_empty())
                    .or_else(|| identity.email.clone())
                    .unwrap_or_default();
                self.companies
                    .create_company(NewCompany {
                        user_id: identity.user_id,
                        name: input.company.clone().unwrap_or_default().trim().to_string(),
                        cnpj: input.cnpj.trim().to_string(),
                        email,
                        city: input.city.trim().to_string(),
                        state: input.state.trim().to_string(),
                        address: input.location.trim().to_string(),
                    })
                    .await?
            }
        };

        let today = Utc::now().date_naive();
        let process = self
            .processes
            .create_process(NewLicenseProcess::submitted(
                identity.user_id,
                company.id,
                &input,
                today,
            ))
            .await?;

        Ok(ProcessWithCompany {
            process,
            company,
            is_owner: true,
            permission_level: None,
        })
    }

    pub async fn update(
        &self,
        identity: &Identity,
        id: Uuid,
        update: ProcessUpdate,
    ) -> Result<LicenseProcess, AppError> {
        update.validate()?;
        if update.is_empty() {
            return Err(AppError::InvalidRequest("No fields to update".to_string()));
        }
        owned_process(self.processes.as_ref(), identity.user_id, id, MODIFY_FORBIDDEN).await?;

        self.processes
            .update_process(id, &update)
            .await?
            .ok_or_else(|| AppError::NotFound(PROCESS_NOT_FOUND.to_string()))
    }

    pub async fn delete(&self, identity: &Identity, id: Uuid) -> Result<(), AppError> {
        owned_process(self.processes.as_ref(), identity.user_id, id, MODIFY_FORBIDDEN).await?;
        if !self.processes.delete_process(id).await? {
            return Err(AppError::NotFound(PROCESS_NOT_FOUND.to_string()));
        }
        tracing::info!(process_id = %id, user_id = %identity.user_id, "License process deleted");
        Ok(())
    }

    /// Counts by status over the caller's own processes
    pub async fn stats(&self, identity: &Identity) -> Result<ProcessStats, AppError> {
        let statuses = self.processes.owned_statuses(identity.user_id).await?;
        Ok(ProcessStats::from_statuses(statuses))
    }
}
