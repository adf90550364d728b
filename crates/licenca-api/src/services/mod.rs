//! Business logic behind the handlers. Services own `Arc`s to the stores and
//! the storage backend and are cheap to clone into the application state.

pub mod access;
pub mod access_broker;
pub mod attachments;
pub mod files;
pub mod processes;

pub use access_broker::AccessBroker;
pub use attachments::AttachmentService;
pub use files::FileService;
pub use processes::ProcessService;
