//! Validation modules
//!
//! Pure checks shared by the server and the client: the upload file policy,
//! storage path derivation, and license-process input rules.

pub mod process;
pub mod storage_path;
pub mod upload;

pub use process::{expected_completion_date, EXPECTED_MONTHS_LO, EXPECTED_MONTHS_LP_LI};
pub use storage_path::{derive_storage_path, derive_storage_path_with_suffix, sanitize_filename};
pub use upload::{
    guess_content_type, FileRejection, FileValidator, ValidationOutcome, ALLOWED_CONTENT_TYPES, MAX_UPLOAD_BYTES,
};
