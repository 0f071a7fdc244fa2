use async_trait::async_trait;

use super::error::StorageError;
use super::types::{Backend, DeleteOutcome, FileContent, StoredFile, UploadSource};

/// Interface implemented by every storage backend
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Tag attached to every result of this backend
    fn backend(&self) -> Backend;

    /// Store a new object without overwriting an existing one
    async fn upload(
        &self,
        source: UploadSource,
        file_name: &str,
        content_type: &str,
    ) -> Result<StoredFile, StorageError>;

    /// Fetch an object by its storage path
    async fn get(&self, path: &str) -> Result<FileContent, StorageError>;

    /// Remove an object; missing objects are not an error
    async fn delete(&self, path: &str) -> Result<DeleteOutcome, StorageError>;

    /// Time-limited read URL, or `None` when the backend has no such concept
    async fn signed_url(
        &self,
        path: &str,
        expires_in_secs: u64,
    ) -> Result<Option<String>, StorageError>;
}
