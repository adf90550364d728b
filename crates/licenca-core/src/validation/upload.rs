use serde::Serialize;
use utoipa::ToSchema;

/// Largest file accepted for upload (50 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// MIME types accepted for process documents and procuration files.
/// `image/jpg` is a non-standard alias some browsers still report.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/jpg",
    "image/png",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// MIME type for a filename or object key, from its extension. Unknown
/// extensions map to `application/octet-stream`.
pub fn guess_content_type(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Reason a candidate file was refused before any network call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileRejection {
    #[error("O arquivo deve ter no máximo {}MB", .max / (1024 * 1024))]
    TooLarge { size: u64, max: u64 },

    #[error("Tipo de arquivo não permitido. Use PDF, imagens ou documentos Word.")]
    DisallowedType { content_type: String },
}

/// Serializable result of [`FileValidator::check`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationOutcome {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Size and MIME allow-list policy for uploads
#[derive(Debug, Clone)]
pub struct FileValidator {
    max_file_size: u64,
    allowed_content_types: Vec<String>,
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::new(
            MAX_UPLOAD_BYTES,
            ALLOWED_CONTENT_TYPES.iter().map(|s| s.to_string()).collect(),
        )
    }
}

/// Lowercase and drop MIME parameters (`; charset=...`)
pub(crate) fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

impl FileValidator {
    pub fn new(max_file_size: u64, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_content_types: allowed_content_types
                .iter()
                .map(|ct| normalize_content_type(ct))
                .collect(),
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn is_allowed_content_type(&self, content_type: &str) -> bool {
        let normalized = normalize_content_type(content_type);
        self.allowed_content_types.iter().any(|ct| *ct == normalized)
    }

    /// Validate a file by size and declared MIME type.
    ///
    /// Size is checked first so an oversized file of an unknown type reports
    /// the size limit.
    pub fn validate(&self, size: u64, content_type: &str) -> Result<(), FileRejection> {
        if size > self.max_file_size {
            return Err(FileRejection::TooLarge {
                size,
                max: self.max_file_size,
            });
        }

        if !self.is_allowed_content_type(content_type) {
            return Err(FileRejection::DisallowedType {
                content_type: content_type.to_string(),
            });
        }

        Ok(())
    }

    pub fn check(&self, size: u64, content_type: &str) -> ValidationOutcome {
        match self.validate(size, content_type) {
            Ok(()) => ValidationOutcome {
                valid: true,
                error: None,
            },
            Err(rejection) => ValidationOutcome {
                valid: false,
                error: Some(rejection.to_string()),
            },
        }
    }
}
