//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>` and propagate
//! `AppError` (or anything convertible into it) with `?`. The conversion to a
//! response picks the status, body and log level from `ErrorMetadata`.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use licenca_core::{AppError, ErrorMetadata, LogLevel};
use licenca_storage::StorageError;
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether the same request may succeed later
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rule: both the trait and AppError are foreign to this crate)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// Convert JSON body deserialization failures into a 400 with our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidRequest(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that returns our ErrorResponse format (400 + JSON) on deserialization failure.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl HttpAppError {
    fn to_body(&self, hide_details: bool) -> ErrorResponse {
        let app_error = &self.0;
        let (details, error_type) = if hide_details || app_error.is_sensitive() {
            (None, None)
        } else {
            (
                Some(app_error.detailed_message()),
                Some(app_error.error_type().to_string()),
            )
        };

        ErrorResponse {
            error: app_error.client_message(),
            details,
            error_type,
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(&self.0);

        let body = self.to_body(is_production_env());
        (status, Json(body)).into_response()
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidRequest(msg),
            other => AppError::StorageUnavailable {
                message: "Storage request failed".to_string(),
                details: other.to_string(),
            },
        };
        HttpAppError(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_storage_error_not_found() {
        let HttpAppError(app_err) = StorageError::NotFound("File not found".to_string()).into();
        match app_err {
            AppError::NotFound(msg) => assert_eq!(msg, "File not found"),
            other => panic!("Expected NotFound variant, got {other:?}"),
        }
    }

    #[test]
    fn test_from_storage_error_invalid_key() {
        let HttpAppError(app_err) = StorageError::InvalidKey("Invalid key".to_string()).into();
        match app_err {
            AppError::InvalidRequest(msg) => assert_eq!(msg, "Invalid key"),
            other => panic!("Expected InvalidRequest variant, got {other:?}"),
        }
    }

    #[test]
    fn test_from_storage_error_signing_failed() {
        let HttpAppError(app_err) =
            StorageError::SigningFailed("credentials expired".to_string()).into();
        match app_err {
            AppError::StorageUnavailable { details, .. } => {
                assert!(details.contains("credentials expired"))
            }
            other => panic!("Expected StorageUnavailable variant, got {other:?}"),
        }
    }

    #[test]
    fn test_sensitive_error_hides_details() {
        let err = HttpAppError(AppError::StorageUnavailable {
            message: "Failed to create signed upload URL".into(),
            details: "bucket missing".into(),
        });
        let body = err.to_body(false);
        assert_eq!(body.error, "Failed to create signed upload URL");
        assert_eq!(body.code, "STORAGE_UNAVAILABLE");
        assert!(body.details.is_none());
    }

    #[test]
    fn test_production_hides_details() {
        let err = HttpAppError(AppError::NotFound("Process not found".into()));
        assert!(err.to_body(false).details.is_some());
        assert!(err.to_body(true).details.is_none());
    }

    #[test]
    fn test_error_response_shape() {
        let body = HttpAppError(AppError::Forbidden("no".into())).to_body(true);
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["error"], "no");
        assert_eq!(json["code"], "FORBIDDEN");
        assert_eq!(json["recoverable"], false);
        assert!(json.get("details").is_none());
        assert!(json.get("suggested_action").is_some());
    }
}
