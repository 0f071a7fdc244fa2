//! Local filesystem storage backend
//!
//! Files live in one flat directory under their given names. There are no
//! subdirectories and no metadata sidecars.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::error::StorageError;
use super::store::ObjectStore;
use super::types::{Backend, DeleteOutcome, FileContent, StoredFile, UploadSource};
use crate::shared::validation::is_valid_file_name;

pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a name for writing, rejecting anything but a single component
    fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        if !is_valid_file_name(name) {
            return Err(StorageError::InvalidPath(format!(
                "'{}' is not a valid local file name",
                name
            )));
        }
        Ok(self.root.join(name))
    }

    /// Location of an existing name, `None` when it cannot live under the root
    fn locate(&self, name: &str) -> Option<PathBuf> {
        is_valid_file_name(name).then(|| self.root.join(name))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    fn backend(&self) -> Backend {
        Backend::Local
    }

    async fn upload(
        &self,
        source: UploadSource,
        file_name: &str,
        _content_type: &str,
    ) -> Result<StoredFile, StorageError> {
        match source {
            UploadSource::Bytes(data) => {
                let target = self.resolve(file_name)?;
                // create_new keeps an existing file intact; the raw AlreadyExists surfaces as Io
                let mut file = OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&target)
                    .await?;
                file.write_all(&data).await?;
                file.flush().await?;
                debug!("Wrote {} bytes to '{}'", data.len(), target.display());
            }
            UploadSource::LocalFile(existing) => {
                // Already persisted by the caller, nothing to write
                debug!(
                    "'{}' already on disk, storing as '{}'",
                    existing.display(),
                    file_name
                );
            }
        }

        Ok(StoredFile {
            path: file_name.to_string(),
            url: None,
            backend: Backend::Local,
        })
    }

    async fn get(&self, path: &str) -> Result<FileContent, StorageError> {
        // A name that is not a single component can never exist in the flat root
        let Some(location) = self.locate(path) else {
            return Err(StorageError::NotFound(path.to_string()));
        };

        match tokio::fs::metadata(&location).await {
            Ok(meta) if meta.is_file() => Ok(FileContent::LocalPath { path: location }),
            Ok(_) => Err(StorageError::NotFound(path.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> Result<DeleteOutcome, StorageError> {
        let Some(location) = self.locate(path) else {
            return Ok(DeleteOutcome::Absent);
        };

        match tokio::fs::remove_file(&location).await {
            Ok(()) => {
                debug!("Deleted local file '{}'", location.display());
                Ok(DeleteOutcome::Removed)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(DeleteOutcome::Absent),
            Err(e) => Err(e.into()),
        }
    }

    async fn signed_url(
        &self,
        _path: &str,
        _expires_in_secs: u64,
    ) -> Result<Option<String>, StorageError> {
        Ok(None)
    }
}
