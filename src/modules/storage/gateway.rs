use std::sync::Arc;

use tracing::{debug, info};

use super::error::StorageError;
use super::hosted_store::HostedStore;
use super::local_store::LocalStore;
use super::store::ObjectStore;
use super::types::{Backend, DeleteOutcome, FileContent, StoredFile, UploadSource};
use crate::core::config::StorageConfig;

/// Single entry point for document storage
///
/// Wraps exactly one [`ObjectStore`], selected when the gateway is built.
/// Every result carries the backend tag of that store.
#[derive(Clone)]
pub struct StorageGateway {
    store: Arc<dyn ObjectStore>,
    default_expiry_secs: u64,
}

impl StorageGateway {
    /// Wrap an already constructed store
    pub fn new(store: Arc<dyn ObjectStore>, default_expiry_secs: u64) -> Self {
        Self {
            store,
            default_expiry_secs,
        }
    }

    /// Select the backend from configuration
    ///
    /// The hosted backend is used when both the endpoint and the service key
    /// are set; otherwise files go to the local directory, which is created
    /// if missing.
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let store: Arc<dyn ObjectStore> = match config.hosted_credentials() {
            Some((endpoint, service_key)) => Arc::new(HostedStore::new(
                endpoint,
                service_key,
                &config.bucket,
                config.public_bucket,
            )?),
            None => {
                let local = LocalStore::new(&config.local_root)?;
                info!("Local storage directory: {}", local.root().display());
                Arc::new(local)
            }
        };

        let gateway = Self::new(store, config.signed_url_expiry_secs);
        info!("Storage gateway using {} backend", gateway.backend());

        Ok(gateway)
    }

    pub fn backend(&self) -> Backend {
        self.store.backend()
    }

    pub fn is_using_hosted_storage(&self) -> bool {
        self.backend() == Backend::Hosted
    }

    /// Store a new file
    ///
    /// # Arguments
    /// * `source` - Bytes in memory or a file already written to disk
    /// * `file_name` - Desired file name
    /// * `content_type` - Declared MIME type
    pub async fn upload_file(
        &self,
        source: impl Into<UploadSource>,
        file_name: &str,
        content_type: &str,
    ) -> Result<StoredFile, StorageError> {
        let stored = self
            .store
            .upload(source.into(), file_name, content_type)
            .await?;

        debug!(
            "Stored '{}' as '{}' on {} backend",
            file_name, stored.path, stored.backend
        );
        Ok(stored)
    }

    /// Fetch a stored file
    ///
    /// Hosted storage yields [`FileContent::Bytes`]; local storage yields
    /// [`FileContent::LocalPath`] for the caller to stream.
    pub async fn get_file(&self, path: &str) -> Result<FileContent, StorageError> {
        self.store.get(path).await
    }

    /// Remove a stored file
    ///
    /// Missing files are reported as [`DeleteOutcome::Absent`]. Hosted
    /// failures come back as [`DeleteOutcome::Failed`] instead of an error.
    pub async fn delete_file(&self, path: &str) -> Result<DeleteOutcome, StorageError> {
        let outcome = self.store.delete(path).await?;
        debug!("Delete of '{}' finished: {}", path, outcome.as_str());
        Ok(outcome)
    }

    /// Time-limited read URL for a stored file
    ///
    /// # Arguments
    /// * `path` - Storage path returned by upload
    /// * `expires_in` - Lifetime in seconds, defaults to the configured expiry
    ///
    /// # Returns
    /// `None` on the local backend, which has no private URLs
    pub async fn get_signed_url(
        &self,
        path: &str,
        expires_in: Option<u64>,
    ) -> Result<Option<String>, StorageError> {
        let expires_in = expires_in.unwrap_or(self.default_expiry_secs);
        self.store.signed_url(path, expires_in).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn hosted_config(endpoint: &str) -> StorageConfig {
        StorageConfig {
            endpoint: Some(endpoint.to_string()),
            service_key: Some("service-key".to_string()),
            ..StorageConfig::local("/nonexistent/should-not-be-created")
        }
    }

    #[tokio::test]
    async fn test_local_scenario_without_hosted_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("uploads");
        let gateway = StorageGateway::from_config(&StorageConfig::local(&root)).unwrap();

        assert!(!gateway.is_using_hosted_storage());
        assert!(root.is_dir());

        let stored = gateway
            .upload_file(b"hello".to_vec(), "a.txt", "text/plain")
            .await
            .unwrap();
        assert_eq!(
            stored,
            StoredFile {
                path: "a.txt".to_string(),
                url: None,
                backend: Backend::Local,
            }
        );
        assert_eq!(std::fs::read(root.join("a.txt")).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_local_round_trip_and_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = StorageGateway::from_config(&StorageConfig::local(dir.path())).unwrap();

        let stored = gateway
            .upload_file(b"proposal".to_vec(), "proposal.pdf", "application/pdf")
            .await
            .unwrap();

        let FileContent::LocalPath { path } = gateway.get_file(&stored.path).await.unwrap() else {
            panic!("local backend must return a path");
        };
        assert_eq!(tokio::fs::read(path).await.unwrap(), b"proposal");

        assert_eq!(gateway.get_signed_url(&stored.path, None).await.unwrap(), None);
        assert_eq!(
            gateway.delete_file(&stored.path).await.unwrap(),
            DeleteOutcome::Removed
        );
        assert_eq!(
            gateway.delete_file(&stored.path).await.unwrap(),
            DeleteOutcome::Absent
        );
    }

    #[tokio::test]
    async fn test_hosted_scenario_with_endpoint_and_credential() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/storage/v1/object/documents/uploads/\d+-a\.txt$"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/storage/v1/object/documents/uploads/\d+-a\.txt$"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello".to_vec()))
            .mount(&server)
            .await;

        let gateway = StorageGateway::from_config(&hosted_config(&server.uri())).unwrap();
        assert!(gateway.is_using_hosted_storage());

        let stored = gateway
            .upload_file(b"hello".to_vec(), "a.txt", "text/plain")
            .await
            .unwrap();
        assert_eq!(stored.backend, Backend::Hosted);
        let (timestamp, name) = stored
            .path
            .strip_prefix("uploads/")
            .and_then(|rest| rest.split_once('-'))
            .unwrap();
        assert!(timestamp.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(name, "a.txt");

        match gateway.get_file(&stored.path).await.unwrap() {
            FileContent::Bytes { data } => assert_eq!(&data[..], b"hello"),
            FileContent::LocalPath { .. } => panic!("hosted backend must return bytes"),
        }
    }

    #[tokio::test]
    async fn test_hosted_signed_url_uses_default_expiry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/storage/v1/object/sign/documents/.+$"))
            .and(wiremock::matchers::body_json(json!({ "expiresIn": 3600 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "signedURL": "/object/sign/documents/uploads/1-a.txt?token=t"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = StorageGateway::from_config(&hosted_config(&server.uri())).unwrap();
        let url = gateway
            .get_signed_url("uploads/1-a.txt", None)
            .await
            .unwrap()
            .unwrap();
        assert!(url.ends_with("?token=t"));
    }

    #[tokio::test]
    async fn test_hosted_delete_failure_does_not_raise() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let gateway = StorageGateway::from_config(&hosted_config(&server.uri())).unwrap();
        let outcome = gateway.delete_file("uploads/1-a.txt").await.unwrap();
        assert!(matches!(outcome, DeleteOutcome::Failed { .. }));
    }

    #[test]
    fn test_backend_is_fixed_for_gateway_lifetime() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = StorageGateway::from_config(&StorageConfig::local(dir.path())).unwrap();
        let clone = gateway.clone();

        for _ in 0..3 {
            assert_eq!(gateway.backend(), Backend::Local);
            assert_eq!(clone.backend(), Backend::Local);
        }
    }
}
