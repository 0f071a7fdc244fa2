use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::modules::storage::{Backend, DeleteOutcome, StoredFile};

/// Storage backend tag returned with every document response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendDto {
    /// Hosted object storage
    Hosted,
    /// Server filesystem
    Local,
}

impl From<Backend> for StorageBackendDto {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Hosted => StorageBackendDto::Hosted,
            Backend::Local => StorageBackendDto::Local,
        }
    }
}

/// Upload document request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadDocumentDto {
    /// The document to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Optional name to store the document under instead of the uploaded file name
    #[schema(example = "brief.pdf")]
    pub file_name: Option<String>,
}

/// Response DTO for a stored document
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StoredDocumentDto {
    /// Storage path to use for download, delete and signing
    #[schema(example = "uploads/1718000000000-brief.pdf")]
    pub path: String,
    /// Direct URL when the backend serves the document publicly
    pub url: Option<String>,
    /// Backend that stored the document
    pub backend: StorageBackendDto,
}

impl From<StoredFile> for StoredDocumentDto {
    fn from(stored: StoredFile) -> Self {
        Self {
            path: stored.path,
            url: stored.url,
            backend: stored.backend.into(),
        }
    }
}

/// Response DTO for delete operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteDocumentResponseDto {
    /// Whether the document is gone from storage
    pub deleted: bool,
    /// "removed", "absent" or "failed"
    #[schema(example = "removed")]
    pub outcome: String,
    /// Provider message when the delete failed
    pub reason: Option<String>,
}

impl From<DeleteOutcome> for DeleteDocumentResponseDto {
    fn from(outcome: DeleteOutcome) -> Self {
        let status = outcome.as_str().to_string();
        match outcome {
            DeleteOutcome::Removed | DeleteOutcome::Absent => Self {
                deleted: true,
                outcome: status,
                reason: None,
            },
            DeleteOutcome::Failed { reason } => Self {
                deleted: false,
                outcome: status,
                reason: Some(reason),
            },
        }
    }
}

/// Query parameters for signed URL generation
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SignedUrlQuery {
    /// Storage path of the document
    #[validate(length(min = 1, message = "path is required"))]
    pub path: String,
    /// Lifetime of the URL in seconds (default: 3600, max: 7 days)
    #[validate(range(min = 1, max = 604800, message = "expires_in must be between 1 and 604800"))]
    #[param(minimum = 1, maximum = 604800)]
    pub expires_in: Option<u64>,
}

/// Response DTO for signed URL generation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignedUrlResponseDto {
    /// Signed URL, or null when the backend serves documents directly
    pub url: Option<String>,
    pub backend: StorageBackendDto,
}

/// Response DTO describing the active storage backend
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StorageBackendResponseDto {
    pub backend: StorageBackendDto,
    /// True when documents are kept in hosted storage
    pub hosted: bool,
}

/// Allowed MIME types for document uploads
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/plain",
    "text/csv",
    "image/jpeg",
    "image/png",
    "image/webp",
];

/// Maximum document size in bytes (10MB)
pub const MAX_DOCUMENT_SIZE: usize = 10 * 1024 * 1024;

/// Check if a MIME type is allowed
pub fn is_mime_type_allowed(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}

/// Guess the content type of a stored document from its extension
pub fn get_content_type_from_path(path: &str) -> &'static str {
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
