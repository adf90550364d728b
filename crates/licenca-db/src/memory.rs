//! In-memory store implementations for testing
//!
//! One [`MemoryStore`] implements every store trait over shared maps, so a
//! test can seed companies, processes and collaborators and then hand the
//! same instance to the API as all four stores.

use async_trait::async_trait;
use chrono::Utc;
use licenca_core::models::{
    CollaboratorStatus, Company, EnvironmentalImpact, LicenseProcess, LicenseType, NewCompany,
    NewLicenseProcess, NewProcessDocument, PermissionLevel, ProcessCollaborator, ProcessDocument,
    ProcessStatus, ProcessUpdate, ProcessWithCompany, StoredFileMetadata,
};
use licenca_core::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::traits::{CollaboratorStore, CompanyStore, DocumentStore, ProcessStore};

#[derive(Default)]
struct Tables {
    companies: HashMap<Uuid, Company>,
    processes: HashMap<Uuid, LicenseProcess>,
    collaborators: HashMap<Uuid, ProcessCollaborator>,
    documents: Vec<ProcessDocument>,
}

impl Tables {
    fn with_company(&self, process: &LicenseProcess) -> Result<Company, AppError> {
        self.companies
            .get(&process.company_id)
            .cloned()
            .ok_or_else(|| {
                AppError::Internal(format!("Company {} missing for process", process.company_id))
            })
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_company(&self, company: Company) {
        self.tables.write().await.companies.insert(company.id, company);
    }

    pub async fn insert_process(&self, process: LicenseProcess) {
        self.tables.write().await.processes.insert(process.id, process);
    }

    pub async fn insert_collaborator(&self, collaborator: ProcessCollaborator) {
        self.tables
            .write()
            .await
            .collaborators
            .insert(collaborator.id, collaborator);
    }

    pub async fn collaborator(&self, id: Uuid) -> Option<ProcessCollaborator> {
        self.tables.read().await.collaborators.get(&id).cloned()
    }

    pub async fn documents(&self) -> Vec<ProcessDocument> {
        self.tables.read().await.documents.clone()
    }

    /// Seed a company and a freshly submitted LP process owned by `owner`.
    pub async fn seed_process(&self, owner: Uuid) -> LicenseProcess {
        let now = Utc::now();
        let company = Company {
            id: Uuid::new_v4(),
            user_id: owner,
            name: "Mineradora Exemplo".into(),
            cnpj: "12.345.678/0001-90".into(),
            email: "contato@example.com".into(),
            city: "Joinville".into(),
            state: "SC".into(),
            address: "BR-101, km 10".into(),
            created_at: now,
        };
        let process = LicenseProcess {
            id: Uuid::new_v4(),
            user_id: owner,
            company_id: company.id,
            license_type: LicenseType::Lp,
            activity: "Extração de areia".into(),
            municipality: "Joinville".into(),
            project_description: "Lavra a céu aberto".into(),
            status: ProcessStatus::Submitted,
            progress: 0,
            submit_date: now.date_naive(),
            expected_date: now.date_naive(),
            location: "BR-101, km 10".into(),
            area: None,
            coordinates: None,
            environmental_impact: EnvironmentalImpact::Baixo,
            estimated_value: None,
            created_at: now,
            updated_at: now,
        };
        self.insert_company(company).await;
        self.insert_process(process.clone()).await;
        process
    }

    /// Seed a collaborator record on `process_id`.
    pub async fn seed_collaborator(
        &self,
        process_id: Uuid,
        user_id: Uuid,
        status: CollaboratorStatus,
    ) -> ProcessCollaborator {
        let collaborator = ProcessCollaborator {
            id: Uuid::new_v4(),
            process_id,
            user_id: Some(user_id),
            email: "colaborador@example.com".into(),
            permission_level: PermissionLevel::Editor,
            status,
            procuracao_file_id: None,
            procuracao_storage_path: None,
            procuracao_file_metadata: None,
            created_at: Utc::now(),
        };
        self.insert_collaborator(collaborator.clone()).await;
        collaborator
    }
}

fn newest_first(list: &mut [ProcessWithCompany]) {
    list.sort_by(|a, b| b.process.created_at.cmp(&a.process.created_at));
}

#[async_trait]
impl ProcessStore for MemoryStore {
    async fn find_process(&self, id: Uuid) -> Result<Option<LicenseProcess>, AppError> {
        Ok(self.tables.read().await.processes.get(&id).cloned())
    }

    async fn find_with_company(
        &self,
        id: Uuid,
    ) -> Result<Option<(LicenseProcess, Company)>, AppError> {
        let tables = self.tables.read().await;
        match tables.processes.get(&id) {
            Some(process) => Ok(Some((process.clone(), tables.with_company(process)?))),
            None => Ok(None),
        }
    }

    async fn list_owned(&self, user_id: Uuid) -> Result<Vec<ProcessWithCompany>, AppError> {
        let tables = self.tables.read().await;
        let mut list = tables
            .processes
            .values()
            .filter(|p| p.user_id == user_id)
            .map(|p| {
                Ok(ProcessWithCompany {
                    process: p.clone(),
                    company: tables.with_company(p)?,
                    is_owner: true,
                    permission_level: None,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;
        newest_first(&mut list);
        Ok(list)
    }

    async fn list_shared_with(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ProcessWithCompany>, AppError> {
        let tables = self.tables.read().await;
        let mut list = Vec::new();
        for collaborator in tables.collaborators.values() {
            if collaborator.user_id != Some(user_id)
                || collaborator.status != CollaboratorStatus::Accepted
            {
                continue;
            }
            if let Some(process) = tables.processes.get(&collaborator.process_id) {
                list.push(ProcessWithCompany {
                    process: process.clone(),
                    company: tables.with_company(process)?,
                    is_owner: false,
                    permission_level: Some(collaborator.permission_level),
                });
            }
        }
        newest_first(&mut list);
        Ok(list)
    }

    async fn create_process(
        &self,
        process: NewLicenseProcess,
    ) -> Result<LicenseProcess, AppError> {
        let now = Utc::now();
        let created = LicenseProcess {
            id: Uuid::new_v4(),
            user_id: process.user_id,
            company_id: process.company_id,
            license_type: process.license_type,
            activity: process.activity,
            municipality: process.municipality,
            project_description: process.project_description,
            status: process.status,
            progress: process.progress,
            submit_date: process.submit_date,
            expected_date: process.expected_date,
            location: process.location,
            area: process.area,
            coordinates: process.coordinates,
            environmental_impact: process.environmental_impact,
            estimated_value: process.estimated_value,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .await
            .processes
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_process(
        &self,
        id: Uuid,
        update: &ProcessUpdate,
    ) -> Result<Option<LicenseProcess>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.processes.get_mut(&id).map(|process| {
            update.apply_to(process);
            process.updated_at = Utc::now();
            process.clone()
        }))
    }

    async fn delete_process(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let removed = tables.processes.remove(&id).is_some();
        if removed {
            tables.collaborators.retain(|_, c| c.process_id != id);
            tables.documents.retain(|d| d.process_id != id);
        }
        Ok(removed)
    }

    async fn owned_statuses(&self, user_id: Uuid) -> Result<Vec<ProcessStatus>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .processes
            .values()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.status)
            .collect())
    }
}

#[async_trait]
impl CompanyStore for MemoryStore {
    async fn find_company(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        Ok(self.tables.read().await.companies.get(&id).cloned())
    }

    async fn create_company(&self, company: NewCompany) -> Result<Company, AppError> {
        let created = Company {
            id: Uuid::new_v4(),
            user_id: company.user_id,
            name: company.name,
            cnpj: company.cnpj,
            email: company.email,
            city: company.city,
            state: company.state,
            address: company.address,
            created_at: Utc::now(),
        };
        self.insert_company(created.clone()).await;
        Ok(created)
    }
}

#[async_trait]
impl CollaboratorStore for MemoryStore {
    async fn find_collaborator(&self, id: Uuid) -> Result<Option<ProcessCollaborator>, AppError> {
        Ok(self.collaborator(id).await)
    }

    async fn find_membership(
        &self,
        process_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProcessCollaborator>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .collaborators
            .values()
            .find(|c| {
                c.process_id == process_id
                    && c.user_id == Some(user_id)
                    && c.status == CollaboratorStatus::Accepted
            })
            .cloned())
    }

    async fn set_procuration(
        &self,
        id: Uuid,
        stored: &StoredFileMetadata,
    ) -> Result<Option<ProcessCollaborator>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.collaborators.get_mut(&id).map(|collaborator| {
            collaborator.apply_procuration(stored);
            collaborator.clone()
        }))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_documents(&self, process_id: Uuid) -> Result<Vec<ProcessDocument>, AppError> {
        let mut docs: Vec<_> = self
            .tables
            .read()
            .await
            .documents
            .iter()
            .filter(|d| d.process_id == process_id)
            .cloned()
            .collect();
        docs.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(docs)
    }

    async fn record_document(
        &self,
        document: NewProcessDocument,
    ) -> Result<ProcessDocument, AppError> {
        let mut tables = self.tables.write().await;
        tables
            .documents
            .retain(|d| !(d.process_id == document.process_id && d.file_path == document.file_path));
        let created = ProcessDocument {
            id: Uuid::new_v4(),
            process_id: document.process_id,
            name: document.name,
            file_path: document.file_path,
            file_size: document.file_size,
            file_type: document.file_type,
            uploaded_by: document.uploaded_by,
            uploaded_at: Utc::now(),
        };
        tables.documents.push(created.clone());
        Ok(created)
    }

    async fn remove_document(&self, process_id: Uuid, file_path: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.documents.len();
        tables
            .documents
            .retain(|d| !(d.process_id == process_id && d.file_path == file_path));
        Ok(tables.documents.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use licenca_core::models::FileMetadata;

    async fn seeded(owner: Uuid) -> (MemoryStore, Company) {
        let store = MemoryStore::new();
        let company = store
            .create_company(NewCompany {
                user_id: owner,
                name: "Mineradora Exemplo".into(),
                cnpj: "12.345.678/0001-90".into(),
                email: "".into(),
                city: "Joinville".into(),
                state: "SC".into(),
                address: "BR-101".into(),
            })
            .await
            .unwrap();
        (store, company)
    }

    fn new_process(owner: Uuid, company_id: Uuid) -> NewLicenseProcess {
        let today = Utc::now().date_naive();
        NewLicenseProcess {
            user_id: owner,
            company_id,
            license_type: LicenseType::Lp,
            activity: "Extração de areia".into(),
            municipality: "Joinville".into(),
            project_description: "Lavra".into(),
            status: ProcessStatus::Submitted,
            progress: 0,
            submit_date: today,
            expected_date: today,
            location: "BR-101".into(),
            area: None,
            coordinates: None,
            environmental_impact: EnvironmentalImpact::Baixo,
            estimated_value: None,
        }
    }

    #[tokio::test]
    async fn test_owned_and_shared_listing() {
        let owner = Uuid::new_v4();
        let colleague = Uuid::new_v4();
        let (store, company) = seeded(owner).await;
        let process = store
            .create_process(new_process(owner, company.id))
            .await
            .unwrap();

        store
            .insert_collaborator(ProcessCollaborator {
                id: Uuid::new_v4(),
                process_id: process.id,
                user_id: Some(colleague),
                email: "c@example.com".into(),
                permission_level: PermissionLevel::Editor,
                status: CollaboratorStatus::Accepted,
                procuracao_file_id: None,
                procuracao_storage_path: None,
                procuracao_file_metadata: None,
                created_at: Utc::now(),
            })
            .await;

        let owned = store.list_owned(owner).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert!(owned[0].is_owner);

        let shared = store.list_shared_with(colleague).await.unwrap();
        assert_eq!(shared.len(), 1);
        assert!(!shared[0].is_owner);
        assert_eq!(shared[0].permission_level, Some(PermissionLevel::Editor));
        assert!(store.find_membership(process.id, colleague).await.unwrap().is_some());
        assert!(store.find_membership(process.id, owner).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_record_document_replaces_same_path() {
        let owner = Uuid::new_v4();
        let (store, company) = seeded(owner).await;
        let process = store
            .create_process(new_process(owner, company.id))
            .await
            .unwrap();

        for size in [10, 20] {
            store
                .record_document(NewProcessDocument {
                    process_id: process.id,
                    name: "a.pdf".into(),
                    file_path: format!("{}/a.pdf", process.id),
                    file_size: size,
                    file_type: "application/pdf".into(),
                    uploaded_by: owner,
                })
                .await
                .unwrap();
        }

        let docs = store.list_documents(process.id).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].file_size, 20);

        let path = format!("{}/a.pdf", process.id);
        assert!(store.remove_document(process.id, &path).await.unwrap());
        assert!(!store.remove_document(process.id, &path).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_procuration_on_missing_collaborator() {
        let store = MemoryStore::new();
        let stored = StoredFileMetadata {
            file_id: "f".into(),
            storage_path: "p/a.pdf".into(),
            metadata: FileMetadata::new("a.pdf", 1, "application/pdf"),
        };
        assert!(store
            .set_procuration(Uuid::new_v4(), &stored)
            .await
            .unwrap()
            .is_none());
    }
}
