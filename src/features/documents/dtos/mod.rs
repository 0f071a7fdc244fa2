pub mod document_dto;

pub use document_dto::{
    get_content_type_from_path, is_mime_type_allowed, DeleteDocumentResponseDto,
    SignedUrlQuery, SignedUrlResponseDto, StorageBackendDto, StorageBackendResponseDto,
    StoredDocumentDto, UploadDocumentDto, ALLOWED_MIME_TYPES, MAX_DOCUMENT_SIZE,
};
