pub mod document_handler;

pub use document_handler::{
    __path_delete_document, __path_download_document, __path_get_signed_url,
    __path_get_storage_backend, __path_upload_document, delete_document, download_document,
    get_signed_url, get_storage_backend, upload_document,
};
