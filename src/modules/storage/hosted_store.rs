//! Hosted object-storage client
//!
//! Talks to a storage REST API (`/storage/v1/object/...`) authenticated with
//! a service key sent as a bearer token. All documents live in one bucket
//! under the `uploads/` prefix.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::error::StorageError;
use super::store::ObjectStore;
use super::types::{Backend, DeleteOutcome, FileContent, StoredFile, UploadSource};

/// Namespace every uploaded object is placed under
pub const UPLOAD_PREFIX: &str = "uploads";

/// Hosted object-storage client
pub struct HostedStore {
    endpoint: String,
    service_key: String,
    bucket: String,
    public_bucket: bool,
    http_client: Client,
}

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    #[serde(rename = "signedURL", alias = "signedUrl")]
    signed_url: String,
}

/// How the provider classified a failed request
#[derive(Debug, PartialEq, Eq)]
enum ProviderFailure {
    NotFound,
    Duplicate,
    Other(String),
}

impl HostedStore {
    /// Create a new hosted storage client
    ///
    /// # Arguments
    /// * `endpoint` - Base URL of the storage service
    /// * `service_key` - Service credential used for every request
    /// * `bucket` - Bucket holding the documents
    /// * `public_bucket` - Whether objects are readable through a public URL
    pub fn new(
        endpoint: &str,
        service_key: &str,
        bucket: &str,
        public_bucket: bool,
    ) -> Result<Self, StorageError> {
        let http_client = Client::builder()
            .build()
            .map_err(|e| StorageError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        let store = Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            bucket: bucket.to_string(),
            public_bucket,
            http_client,
        };

        info!(
            "Hosted storage initialized for endpoint: {}, bucket: {}, public: {}",
            store.endpoint, store.bucket, store.public_bucket
        );

        Ok(store)
    }

    /// Generate a collision-resistant object path for a file name
    ///
    /// # Returns
    /// The object path (e.g., "uploads/1718000000000-report.pdf")
    pub fn generate_path(file_name: &str) -> String {
        format!(
            "{}/{}-{}",
            UPLOAD_PREFIX,
            Utc::now().timestamp_millis(),
            file_name
        )
    }

    /// Direct URL for an object in a public bucket
    pub fn get_public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.endpoint,
            self.bucket,
            encode_path(path)
        )
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.endpoint,
            self.bucket,
            encode_path(path)
        )
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
    }

    async fn read_bytes(source: UploadSource) -> Result<Vec<u8>, StorageError> {
        match source {
            UploadSource::Bytes(data) => Ok(data.to_vec()),
            UploadSource::LocalFile(path) => Ok(tokio::fs::read(path).await?),
        }
    }
}

#[async_trait]
impl ObjectStore for HostedStore {
    fn backend(&self) -> Backend {
        Backend::Hosted
    }

    async fn upload(
        &self,
        source: UploadSource,
        file_name: &str,
        content_type: &str,
    ) -> Result<StoredFile, StorageError> {
        let path = Self::generate_path(file_name);
        let data = Self::read_bytes(source).await?;
        let size = data.len();

        let response = self
            .authorized(self.http_client.post(self.object_url(&path)))
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(data)
            .send()
            .await
            .map_err(|e| StorageError::Provider(format!("Failed to upload '{}': {}", path, e)))?;

        if !response.status().is_success() {
            return Err(match classify_failure(response).await {
                ProviderFailure::Duplicate => StorageError::AlreadyExists(path),
                ProviderFailure::NotFound => StorageError::Provider(format!(
                    "Bucket '{}' not found while uploading '{}'",
                    self.bucket, path
                )),
                ProviderFailure::Other(msg) => {
                    StorageError::Provider(format!("Failed to upload '{}': {}", path, msg))
                }
            });
        }

        debug!(
            "Uploaded '{}' ({} bytes) to bucket '{}'",
            path, size, self.bucket
        );

        let url = self.public_bucket.then(|| self.get_public_url(&path));

        Ok(StoredFile {
            path,
            url,
            backend: Backend::Hosted,
        })
    }

    async fn get(&self, path: &str) -> Result<FileContent, StorageError> {
        let response = self
            .authorized(self.http_client.get(self.object_url(path)))
            .send()
            .await
            .map_err(|e| StorageError::Provider(format!("Failed to download '{}': {}", path, e)))?;

        if !response.status().is_success() {
            return Err(match classify_failure(response).await {
                ProviderFailure::NotFound => StorageError::NotFound(path.to_string()),
                ProviderFailure::Duplicate => {
                    StorageError::Provider(format!("Unexpected conflict downloading '{}'", path))
                }
                ProviderFailure::Other(msg) => {
                    StorageError::Provider(format!("Failed to download '{}': {}", path, msg))
                }
            });
        }

        let data = response.bytes().await.map_err(|e| {
            StorageError::Provider(format!("Failed to read body of '{}': {}", path, e))
        })?;

        debug!(
            "Downloaded '{}' ({} bytes) from bucket '{}'",
            path,
            data.len(),
            self.bucket
        );
        Ok(FileContent::Bytes { data })
    }

    async fn delete(&self, path: &str) -> Result<DeleteOutcome, StorageError> {
        let url = format!("{}/storage/v1/object/{}", self.endpoint, self.bucket);
        let result = self
            .authorized(self.http_client.delete(url))
            .json(&json!({ "prefixes": [path] }))
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to delete '{}' from hosted storage: {}", path, e);
                return Ok(DeleteOutcome::Failed {
                    reason: e.to_string(),
                });
            }
        };

        if !response.status().is_success() {
            let reason = match classify_failure(response).await {
                ProviderFailure::NotFound => return Ok(DeleteOutcome::Absent),
                ProviderFailure::Duplicate => "conflict".to_string(),
                ProviderFailure::Other(msg) => msg,
            };
            warn!("Failed to delete '{}' from hosted storage: {}", path, reason);
            return Ok(DeleteOutcome::Failed { reason });
        }

        // The provider answers with the list of objects it removed
        let removed = response
            .json::<Vec<Value>>()
            .await
            .map(|objects| !objects.is_empty())
            .unwrap_or(true);

        if removed {
            debug!("Deleted '{}' from bucket '{}'", path, self.bucket);
            Ok(DeleteOutcome::Removed)
        } else {
            debug!("Nothing to delete at '{}' in bucket '{}'", path, self.bucket);
            Ok(DeleteOutcome::Absent)
        }
    }

    async fn signed_url(
        &self,
        path: &str,
        expires_in_secs: u64,
    ) -> Result<Option<String>, StorageError> {
        let url = format!(
            "{}/storage/v1/object/sign/{}/{}",
            self.endpoint,
            self.bucket,
            encode_path(path)
        );

        let response = self
            .authorized(self.http_client.post(url))
            .json(&json!({ "expiresIn": expires_in_secs }))
            .send()
            .await
            .map_err(|e| {
                StorageError::Provider(format!("Failed to sign URL for '{}': {}", path, e))
            })?;

        if !response.status().is_success() {
            let msg = match classify_failure(response).await {
                ProviderFailure::NotFound => format!("object '{}' not found", path),
                ProviderFailure::Duplicate => "conflict".to_string(),
                ProviderFailure::Other(msg) => msg,
            };
            return Err(StorageError::Provider(format!(
                "Failed to sign URL for '{}': {}",
                path, msg
            )));
        }

        let signed: SignedUrlResponse = response.json().await.map_err(|e| {
            StorageError::Provider(format!("Invalid signed URL response for '{}': {}", path, e))
        })?;

        // The provider returns a path relative to /storage/v1
        let absolute = if signed.signed_url.starts_with("http") {
            signed.signed_url
        } else {
            format!("{}/storage/v1{}", self.endpoint, signed.signed_url)
        };

        Ok(Some(absolute))
    }
}

/// Percent-encode each segment of an object path, keeping the separators
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Read an error response and decide what kind of failure it was
///
/// Some providers report errors with HTTP 400 and the real status inside
/// the JSON body (`{"statusCode": "404", "error": "not_found", ...}`).
async fn classify_failure(response: Response) -> ProviderFailure {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    classify(status, &body)
}

fn classify(status: StatusCode, body: &str) -> ProviderFailure {
    match status {
        StatusCode::NOT_FOUND => return ProviderFailure::NotFound,
        StatusCode::CONFLICT => return ProviderFailure::Duplicate,
        _ => {}
    }

    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return ProviderFailure::Other(format!("{} - {}", status, body));
    };

    let inner_status = match value.get("statusCode") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    let error = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase();

    if inner_status == "404" || error == "not_found" {
        ProviderFailure::NotFound
    } else if inner_status == "409" || error == "duplicate" {
        ProviderFailure::Duplicate
    } else {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(body);
        ProviderFailure::Other(format!("{} - {}", status, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KEY: &str = "service-key";

    fn store(server: &MockServer, public_bucket: bool) -> HostedStore {
        HostedStore::new(&server.uri(), KEY, "documents", public_bucket).unwrap()
    }

    #[test]
    fn test_generate_path() {
        let path = HostedStore::generate_path("a.txt");
        let rest = path.strip_prefix("uploads/").unwrap();
        let (timestamp, name) = rest.split_once('-').unwrap();
        assert!(timestamp.parse::<i64>().is_ok());
        assert_eq!(name, "a.txt");
    }

    #[test]
    fn test_encode_path_keeps_separators() {
        assert_eq!(
            encode_path("uploads/1-my report.pdf"),
            "uploads/1-my%20report.pdf"
        );
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify(StatusCode::NOT_FOUND, ""),
            ProviderFailure::NotFound
        );
        assert_eq!(
            classify(
                StatusCode::BAD_REQUEST,
                r#"{"statusCode":"409","error":"Duplicate","message":"The resource already exists"}"#
            ),
            ProviderFailure::Duplicate
        );
        assert_eq!(
            classify(
                StatusCode::BAD_REQUEST,
                r#"{"statusCode":"404","error":"not_found","message":"Object not found"}"#
            ),
            ProviderFailure::NotFound
        );
        assert_eq!(
            classify(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            ProviderFailure::Other("500 Internal Server Error - boom".to_string())
        );
    }

    #[tokio::test]
    async fn test_upload_uses_timestamped_path_without_upsert() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/storage/v1/object/documents/uploads/\d+-a\.txt$"))
            .and(header("x-upsert", "false"))
            .and(header("authorization", "Bearer service-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "Key": "documents/uploads/1-a.txt" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let stored = store(&server, false)
            .upload(b"hello".to_vec().into(), "a.txt", "text/plain")
            .await
            .unwrap();

        assert!(stored.path.starts_with("uploads/"));
        assert!(stored.path.ends_with("-a.txt"));
        assert_eq!(stored.backend, Backend::Hosted);
        assert_eq!(stored.url, None);
    }

    #[tokio::test]
    async fn test_upload_to_public_bucket_returns_public_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let stored = store(&server, true)
            .upload(b"hello".to_vec().into(), "a.txt", "text/plain")
            .await
            .unwrap();

        let expected = format!(
            "{}/storage/v1/object/public/documents/{}",
            server.uri(),
            stored.path
        );
        assert_eq!(stored.url, Some(expected));
    }

    #[tokio::test]
    async fn test_upload_duplicate_is_already_exists() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "statusCode": "409",
                "error": "Duplicate",
                "message": "The resource already exists"
            })))
            .mount(&server)
            .await;

        let err = store(&server, false)
            .upload(b"hello".to_vec().into(), "a.txt", "text/plain")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_upload_provider_failure_carries_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "statusCode": "403",
                "error": "Unauthorized",
                "message": "invalid signature"
            })))
            .mount(&server)
            .await;

        let err = store(&server, false)
            .upload(b"hello".to_vec().into(), "a.txt", "text/plain")
            .await
            .unwrap_err();
        match err {
            StorageError::Provider(msg) => assert!(msg.contains("invalid signature")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_returns_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/object/documents/uploads/1-a.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello".to_vec()))
            .mount(&server)
            .await;

        let content = store(&server, false).get("uploads/1-a.txt").await.unwrap();
        assert_eq!(
            content,
            FileContent::Bytes {
                data: axum::body::Bytes::from_static(b"hello")
            }
        );
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "statusCode": "404",
                "error": "not_found",
                "message": "Object not found"
            })))
            .mount(&server)
            .await;

        let err = store(&server, false)
            .get("uploads/1-missing.txt")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_sends_prefixes() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/storage/v1/object/documents"))
            .and(body_json(json!({ "prefixes": ["uploads/1-a.txt"] })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{ "name": "uploads/1-a.txt" }])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let outcome = store(&server, false).delete("uploads/1-a.txt").await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Removed);
    }

    #[tokio::test]
    async fn test_delete_missing_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let outcome = store(&server, false).delete("uploads/1-a.txt").await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Absent);
    }

    #[tokio::test]
    async fn test_delete_failure_is_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(500).set_body_string("storage offline"))
            .mount(&server)
            .await;

        let outcome = store(&server, false).delete("uploads/1-a.txt").await.unwrap();
        assert!(matches!(outcome, DeleteOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn test_signed_url_is_absolute() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/object/sign/documents/uploads/1-a.txt"))
            .and(body_json(json!({ "expiresIn": 600 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "signedURL": "/object/sign/documents/uploads/1-a.txt?token=abc"
            })))
            .mount(&server)
            .await;

        let url = store(&server, false)
            .signed_url("uploads/1-a.txt", 600)
            .await
            .unwrap();
        assert_eq!(
            url,
            Some(format!(
                "{}/storage/v1/object/sign/documents/uploads/1-a.txt?token=abc",
                server.uri()
            ))
        );
    }

    #[tokio::test]
    async fn test_signed_url_failure_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("signer down"))
            .mount(&server)
            .await;

        let err = store(&server, false)
            .signed_url("uploads/1-a.txt", 3600)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Provider(_)));
    }
}
