pub mod documents;
pub mod files;
pub mod processes;
pub mod procuration;
pub mod signed_upload;
pub mod storage_objects;
