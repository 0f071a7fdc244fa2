use thiserror::Error;

/// Failures surfaced by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested path does not exist in the active backend
    #[error("object not found: {0}")]
    NotFound(String),

    /// A non-overwriting hosted upload hit an existing object
    #[error("object already exists: {0}")]
    AlreadyExists(String),

    /// Opaque failure reported by the hosted provider
    #[error("storage provider error: {0}")]
    Provider(String),

    /// File name or path that cannot live in the flat local layout
    #[error("invalid storage path: {0}")]
    InvalidPath(String),

    /// Raw filesystem error from the local backend
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}
