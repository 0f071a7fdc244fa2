use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::documents::dtos::MAX_DOCUMENT_SIZE;
use crate::features::documents::handlers::{
    delete_document, download_document, get_signed_url, get_storage_backend, upload_document,
};
use crate::features::documents::services::DocumentService;

/// Create routes for the documents feature
pub fn routes(document_service: Arc<DocumentService>) -> Router {
    Router::new()
        .route(
            "/api/documents",
            // Allow body size up to MAX_DOCUMENT_SIZE + buffer for multipart overhead
            post(upload_document).layer(DefaultBodyLimit::max(MAX_DOCUMENT_SIZE + 1024 * 1024)),
        )
        .route(
            "/api/documents/{*path}",
            get(download_document).delete(delete_document),
        )
        .route("/api/storage/signed-url", get(get_signed_url))
        .route("/api/storage/backend", get(get_storage_backend))
        .with_state(document_service)
}
