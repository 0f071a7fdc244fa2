use utoipa::{Modify, OpenApi};

use crate::features::documents::{dtos as documents_dtos, handlers as documents_handlers};
use crate::shared::types::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Documents
        documents_handlers::upload_document,
        documents_handlers::download_document,
        documents_handlers::delete_document,
        documents_handlers::get_signed_url,
        documents_handlers::get_storage_backend,
    ),
    components(
        schemas(
            // Documents
            documents_dtos::UploadDocumentDto,
            documents_dtos::StorageBackendDto,
            documents_dtos::StoredDocumentDto,
            documents_dtos::DeleteDocumentResponseDto,
            documents_dtos::SignedUrlResponseDto,
            documents_dtos::StorageBackendResponseDto,
            ApiResponse<documents_dtos::StoredDocumentDto>,
            ApiResponse<documents_dtos::DeleteDocumentResponseDto>,
            ApiResponse<documents_dtos::SignedUrlResponseDto>,
            ApiResponse<documents_dtos::StorageBackendResponseDto>,
        )
    ),
    tags(
        (name = "documents", description = "Document upload, download and signed URLs"),
    ),
    info(
        title = "Storage Gateway API",
        version = "0.1.0",
        description = "API documentation for the document storage gateway",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
