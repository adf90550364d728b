//! Ownership checks shared by the services

use licenca_core::models::LicenseProcess;
use licenca_core::AppError;
use licenca_db::{CollaboratorStore, ProcessStore};
use uuid::Uuid;

pub const PROCESS_NOT_FOUND: &str = "Process not found";

/// Parse a process id taken from a request. Anything that is not a UUID
/// cannot name an existing process.
pub fn parse_process_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound(PROCESS_NOT_FOUND.to_string()))
}

/// The process whose id is the first segment of `storage_path`
pub fn process_id_of_path(storage_path: &str) -> Result<Uuid, AppError> {
    let parent = storage_path.split('/').next().unwrap_or_default();
    parse_process_id(parent)
}

/// Load a process and require `user_id` to own it.
pub async fn owned_process(
    processes: &dyn ProcessStore,
    user_id: Uuid,
    process_id: Uuid,
    forbidden_message: &str,
) -> Result<LicenseProcess, AppError> {
    let process = processes
        .find_process(process_id)
        .await?
        .ok_or_else(|| AppError::NotFound(PROCESS_NOT_FOUND.to_string()))?;

    if process.user_id != user_id {
        tracing::warn!(
            process_id = %process_id,
            owner_id = %process.user_id,
            user_id = %user_id,
            "Caller does not own process"
        );
        return Err(AppError::Forbidden(forbidden_message.to_string()));
    }

    Ok(process)
}

/// Load a process the caller owns or collaborates on (accepted invitation).
pub async fn readable_process(
    processes: &dyn ProcessStore,
    collaborators: &dyn CollaboratorStore,
    user_id: Uuid,
    process_id: Uuid,
    forbidden_message: &str,
) -> Result<LicenseProcess, AppError> {
    let process = processes
        .find_process(process_id)
        .await?
        .ok_or_else(|| AppError::NotFound(PROCESS_NOT_FOUND.to_string()))?;

    if process.user_id == user_id
        || collaborators
            .find_membership(process_id, user_id)
            .await?
            .is_some()
    {
        return Ok(process);
    }

    Err(AppError::Forbidden(forbidden_message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_uuid_parent_is_not_found() {
        match parse_process_id("not-a-process") {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, PROCESS_NOT_FOUND),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_process_id_of_path() {
        let id = Uuid::new_v4();
        let path = format!("{}/2026-10-19T12-00-00-000Z-abc123-contrato.pdf", id);
        assert_eq!(process_id_of_path(&path).unwrap(), id);
        assert!(process_id_of_path("contrato.pdf").is_err());
    }
}
