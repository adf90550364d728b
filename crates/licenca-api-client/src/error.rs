use licenca_core::FileRejection;
use reqwest::{Response, StatusCode};

/// Failure of a single API call
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("API request failed with status {status}: {message}")]
    Status {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },

    #[error("Failed to send request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Read the server's error body (`{error, code, ..}`) when there is one.
    pub(crate) async fn from_response(response: Response) -> Self {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let body: Option<serde_json::Value> = serde_json::from_str(&text).ok();

        let message = body
            .as_ref()
            .and_then(|b| b.get("error"))
            .and_then(|e| e.as_str())
            .map(String::from)
            .unwrap_or_else(|| {
                if text.is_empty() {
                    status.canonical_reason().unwrap_or("Unknown error").to_string()
                } else {
                    text.clone()
                }
            });
        let code = body
            .as_ref()
            .and_then(|b| b.get("code"))
            .and_then(|c| c.as_str())
            .map(String::from);

        ApiError::Status {
            status,
            code,
            message,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure of an upload attempt or of one of its steps
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Refused by local validation; nothing was sent
    #[error("{0}")]
    Rejected(#[from] FileRejection),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The object store refused or never answered the PUT
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    /// The file is stored but its metadata could not be recorded
    #[error("Failed to record file metadata: {0}")]
    PersistFailed(String),

    #[error("Upload cannot move from {from:?} to {to:?}")]
    IllegalTransition {
        from: crate::UploadPhase,
        to: crate::UploadPhase,
    },

    #[error(transparent)]
    Api(ApiError),
}

impl From<ApiError> for UploadError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status {
                status, message, ..
            } => match status {
                StatusCode::UNAUTHORIZED => UploadError::Unauthenticated(message),
                StatusCode::BAD_REQUEST => UploadError::InvalidRequest(message),
                StatusCode::FORBIDDEN => UploadError::Forbidden(message),
                StatusCode::NOT_FOUND => UploadError::NotFound(message),
                s if s.is_server_error() => UploadError::StorageUnavailable(message),
                _ => UploadError::Api(ApiError::Status {
                    status,
                    code: None,
                    message,
                }),
            },
            other => UploadError::Api(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16, message: &str) -> ApiError {
        ApiError::Status {
            status: StatusCode::from_u16(code).unwrap(),
            code: None,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_status_maps_to_upload_error() {
        assert!(matches!(
            UploadError::from(status(401, "Unauthorized")),
            UploadError::Unauthenticated(m) if m == "Unauthorized"
        ));
        assert!(matches!(
            UploadError::from(status(400, "x")),
            UploadError::InvalidRequest(_)
        ));
        assert!(matches!(
            UploadError::from(status(403, "x")),
            UploadError::Forbidden(_)
        ));
        assert!(matches!(
            UploadError::from(status(404, "x")),
            UploadError::NotFound(_)
        ));
        assert!(matches!(
            UploadError::from(status(500, "x")),
            UploadError::StorageUnavailable(_)
        ));
        assert!(matches!(
            UploadError::from(status(409, "x")),
            UploadError::Api(_)
        ));
    }
}
