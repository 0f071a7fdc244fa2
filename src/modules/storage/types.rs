use std::fmt;
use std::path::PathBuf;

use axum::body::Bytes;

/// Which backend produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Hosted object-storage service
    Hosted,
    /// Server's own filesystem
    Local,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Hosted => "hosted",
            Backend::Local => "local",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content handed to an upload
#[derive(Debug, Clone)]
pub enum UploadSource {
    /// Raw payload held in memory
    Bytes(Bytes),
    /// A file the caller has already written to disk
    LocalFile(PathBuf),
}

impl From<Vec<u8>> for UploadSource {
    fn from(data: Vec<u8>) -> Self {
        UploadSource::Bytes(Bytes::from(data))
    }
}

impl From<Bytes> for UploadSource {
    fn from(data: Bytes) -> Self {
        UploadSource::Bytes(data)
    }
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Storage-relative path to pass back into get/delete/sign
    pub path: String,
    /// Direct URL, when the backend can hand one out without signing
    pub url: Option<String>,
    pub backend: Backend,
}

/// Content returned by a fetch
///
/// The hosted backend downloads the object into memory, while the local
/// backend only resolves the path so the caller can stream it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Bytes { data: Bytes },
    LocalPath { path: PathBuf },
}

/// What a delete request actually did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The object existed and was removed
    Removed,
    /// Nothing was stored under the path
    Absent,
    /// The provider refused or failed; logged, never raised
    Failed { reason: String },
}

impl DeleteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteOutcome::Removed => "removed",
            DeleteOutcome::Absent => "absent",
            DeleteOutcome::Failed { .. } => "failed",
        }
    }
}
