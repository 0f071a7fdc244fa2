//! Storage module for document files
//!
//! Provides one uniform interface (upload, fetch, delete, signed URL) over
//! either a hosted object-storage service or a local directory. The backend
//! is chosen once when the [`StorageGateway`] is built and never changes.

mod error;
mod gateway;
mod hosted_store;
mod local_store;
mod store;
mod types;

pub use error::StorageError;
pub use gateway::StorageGateway;
pub use types::{Backend, DeleteOutcome, FileContent, StoredFile, UploadSource};
