use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::io::ErrorKind;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::debug;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::documents::dtos::{
    get_content_type_from_path, is_mime_type_allowed, DeleteDocumentResponseDto,
    SignedUrlQuery, SignedUrlResponseDto, StorageBackendResponseDto, StoredDocumentDto,
    UploadDocumentDto, ALLOWED_MIME_TYPES, MAX_DOCUMENT_SIZE,
};
use crate::features::documents::services::DocumentService;
use crate::modules::storage::{FileContent, UploadSource};
use crate::shared::types::ApiResponse;

/// Upload a document
///
/// Accepts multipart/form-data with:
/// - `file`: The document to upload (required)
/// - `file_name`: Name to store it under (optional, defaults to the uploaded file name)
#[utoipa::path(
    post,
    path = "/api/documents",
    tag = "documents",
    request_body(
        content = UploadDocumentDto,
        content_type = "multipart/form-data",
        description = "Document upload form with an optional file_name override",
    ),
    responses(
        (status = 201, description = "Document stored", body = ApiResponse<StoredDocumentDto>),
        (status = 400, description = "Invalid file or validation error"),
        (status = 409, description = "A document already exists under that name"),
        (status = 413, description = "Document too large"),
        (status = 502, description = "Hosted storage provider failed")
    )
)]
pub async fn upload_document(
    State(service): State<Arc<DocumentService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<StoredDocumentDto>>), AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut name_override: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let ct = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());

                let fname = field.file_name().map(|s| s.to_string());

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                file_data = Some(data.to_vec());
                file_name = fname;
                content_type = Some(ct);
            }
            "file_name" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read file_name field: {}", e))
                })?;
                let text = text.trim();
                if !text.is_empty() {
                    name_override = Some(text.to_string());
                }
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let file_data =
        file_data.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;
    let file_name = name_override
        .or(file_name)
        .ok_or_else(|| AppError::BadRequest("Filename is required".to_string()))?;
    let content_type =
        content_type.ok_or_else(|| AppError::BadRequest("Content type is required".to_string()))?;

    if file_data.is_empty() {
        return Err(AppError::BadRequest("File is empty".to_string()));
    }

    if file_data.len() > MAX_DOCUMENT_SIZE {
        return Err(AppError::PayloadTooLarge(format!(
            "File too large. Maximum size is {} bytes ({} MB)",
            MAX_DOCUMENT_SIZE,
            MAX_DOCUMENT_SIZE / 1024 / 1024
        )));
    }

    if !is_mime_type_allowed(&content_type) {
        return Err(AppError::BadRequest(format!(
            "File type '{}' is not allowed. Allowed types: {}",
            content_type,
            ALLOWED_MIME_TYPES.join(", ")
        )));
    }

    let response = service
        .upload_document(UploadSource::from(file_data), &file_name, &content_type)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(response), None)),
    ))
}

/// Download a document
///
/// Hosted documents are sent from memory; local documents are streamed
/// straight from disk.
#[utoipa::path(
    get,
    path = "/api/documents/{path}",
    tag = "documents",
    params(
        ("path" = String, Path, description = "Storage path returned by upload")
    ),
    responses(
        (status = 200, description = "Document content", content_type = "application/octet-stream"),
        (status = 404, description = "Document not found"),
        (status = 502, description = "Hosted storage provider failed")
    )
)]
pub async fn download_document(
    State(service): State<Arc<DocumentService>>,
    Path(path): Path<String>,
) -> Result<Response, AppError> {
    let content_type = get_content_type_from_path(&path);

    let body = match service.get_document(&path).await? {
        FileContent::Bytes { data } => Body::from(data),
        FileContent::LocalPath { path: local_path } => {
            let file = tokio::fs::File::open(&local_path).await.map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    AppError::NotFound(format!("File not found: {}", path))
                } else {
                    AppError::Internal(format!("Failed to open '{}': {}", local_path.display(), e))
                }
            })?;
            Body::from_stream(ReaderStream::new(file))
        }
    };

    Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
}

/// Delete a document
///
/// Succeeds when the document is already gone. A hosted provider failure is
/// reported with `deleted: false` rather than an error status.
#[utoipa::path(
    delete,
    path = "/api/documents/{path}",
    tag = "documents",
    params(
        ("path" = String, Path, description = "Storage path returned by upload")
    ),
    responses(
        (status = 200, description = "Delete processed", body = ApiResponse<DeleteDocumentResponseDto>),
        (status = 400, description = "Invalid path")
    )
)]
pub async fn delete_document(
    State(service): State<Arc<DocumentService>>,
    Path(path): Path<String>,
) -> Result<Json<ApiResponse<DeleteDocumentResponseDto>>, AppError> {
    let response = service.delete_document(&path).await?;
    let message = if response.deleted {
        "Document deleted successfully"
    } else {
        "Document could not be removed from storage"
    };

    Ok(Json(ApiResponse::success(
        Some(response),
        Some(message.to_string()),
    )))
}

/// Get a signed URL for a document
///
/// Returns `url: null` on local storage; download through
/// `/api/documents/{path}` instead.
#[utoipa::path(
    get,
    path = "/api/storage/signed-url",
    tag = "documents",
    params(SignedUrlQuery),
    responses(
        (status = 200, description = "Signed URL generated", body = ApiResponse<SignedUrlResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Hosted storage provider failed")
    )
)]
pub async fn get_signed_url(
    State(service): State<Arc<DocumentService>>,
    Query(query): Query<SignedUrlQuery>,
) -> Result<Json<ApiResponse<SignedUrlResponseDto>>, AppError> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let response = service
        .get_signed_url(&query.path, query.expires_in)
        .await?;

    Ok(Json(ApiResponse::success(Some(response), None)))
}

/// Get the active storage backend
#[utoipa::path(
    get,
    path = "/api/storage/backend",
    tag = "documents",
    responses(
        (status = 200, description = "Active backend", body = ApiResponse<StorageBackendResponseDto>)
    )
)]
pub async fn get_storage_backend(
    State(service): State<Arc<DocumentService>>,
) -> Json<ApiResponse<StorageBackendResponseDto>> {
    Json(ApiResponse::success(Some(service.backend_info()), None))
}
