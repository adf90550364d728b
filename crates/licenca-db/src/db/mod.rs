//! Database repositories for data access layer
//!
//! Each repository owns one table and implements the matching store trait
//! from `traits`. Queries are built at runtime with `sqlx::query` so the
//! crate compiles without a live `DATABASE_URL`.

pub mod collaborator;
pub mod company;
pub mod document;
pub mod process;
pub mod traits;

pub use collaborator::CollaboratorRepository;
pub use company::CompanyRepository;
pub use document::DocumentRepository;
pub use process::ProcessRepository;
pub use traits::{CollaboratorStore, CompanyStore, DocumentStore, ProcessStore};
