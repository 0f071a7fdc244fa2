use tracing::{debug, info, warn};

use crate::core::error::{AppError, Result};
use crate::features::documents::dtos::{
    DeleteDocumentResponseDto, SignedUrlResponseDto, StorageBackendResponseDto,
    StoredDocumentDto,
};
use crate::modules::storage::{DeleteOutcome, FileContent, StorageGateway, UploadSource};

/// Service for document upload, download and lifecycle
pub struct DocumentService {
    gateway: StorageGateway,
}

impl DocumentService {
    pub fn new(gateway: StorageGateway) -> Self {
        Self { gateway }
    }

    /// Upload a document to the active storage backend
    ///
    /// # Arguments
    /// * `source` - The document content
    /// * `file_name` - Name to store the document under
    /// * `content_type` - MIME type of the document
    pub async fn upload_document(
        &self,
        source: UploadSource,
        file_name: &str,
        content_type: &str,
    ) -> Result<StoredDocumentDto> {
        let stored = self
            .gateway
            .upload_file(source, file_name, content_type)
            .await?;

        info!(
            "Document stored: path={}, backend={}, content_type={}",
            stored.path, stored.backend, content_type
        );

        Ok(stored.into())
    }

    /// Fetch a document
    ///
    /// Returns bytes for hosted storage and a local path for local storage.
    pub async fn get_document(&self, path: &str) -> Result<FileContent> {
        self.gateway.get_file(path).await.map_err(|e| {
            if e.is_not_found() {
                debug!("Document not found: {}", path);
            }
            AppError::from(e)
        })
    }

    /// Delete a document
    ///
    /// Missing documents count as deleted. A hosted provider failure is
    /// reported in the response instead of failing the request.
    pub async fn delete_document(&self, path: &str) -> Result<DeleteDocumentResponseDto> {
        let outcome = self.gateway.delete_file(path).await?;

        match &outcome {
            DeleteOutcome::Removed => info!("Document deleted: {}", path),
            DeleteOutcome::Absent => debug!("Document already absent: {}", path),
            DeleteOutcome::Failed { reason } => {
                warn!("Document could not be deleted: {} ({})", path, reason)
            }
        }

        Ok(outcome.into())
    }

    /// Get a time-limited URL for a document
    ///
    /// # Arguments
    /// * `path` - Storage path of the document
    /// * `expires_in` - Lifetime in seconds, `None` for the configured default
    pub async fn get_signed_url(
        &self,
        path: &str,
        expires_in: Option<u64>,
    ) -> Result<SignedUrlResponseDto> {
        let url = self.gateway.get_signed_url(path, expires_in).await?;

        Ok(SignedUrlResponseDto {
            url,
            backend: self.gateway.backend().into(),
        })
    }

    /// Describe the active storage backend
    pub fn backend_info(&self) -> StorageBackendResponseDto {
        StorageBackendResponseDto {
            backend: self.gateway.backend().into(),
            hosted: self.gateway.is_using_hosted_storage(),
        }
    }
}
