use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub swagger: SwaggerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Document storage configuration
///
/// The hosted backend is active only when both `endpoint` and `service_key`
/// are present. Otherwise documents land in `local_root`.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Hosted storage endpoint URL (e.g. "https://project.storage.example")
    pub endpoint: Option<String>,
    /// Service credential used as a bearer token against the hosted endpoint
    pub service_key: Option<String>,
    /// Bucket holding all documents on the hosted backend
    pub bucket: String,
    /// Whether the hosted bucket serves objects publicly
    pub public_bucket: bool,
    /// Directory used when the hosted backend is not configured
    pub local_root: PathBuf,
    /// Default lifetime of signed URLs in seconds
    pub signed_url_expiry_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            storage: StorageConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 12 * 1024 * 1024; // 12MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title =
            env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Storage Gateway API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Document upload, download and signing API".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl StorageConfig {
    pub const DEFAULT_BUCKET: &'static str = "documents";
    pub const DEFAULT_LOCAL_ROOT: &'static str = "./uploads";
    pub const DEFAULT_SIGNED_URL_EXPIRY_SECS: u64 = 3600; // 1 hour

    pub fn from_env() -> Result<Self, String> {
        let endpoint = env::var("STORAGE_URL").ok().filter(|s| !s.trim().is_empty());
        let service_key = env::var("STORAGE_SERVICE_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let bucket =
            env::var("STORAGE_BUCKET").unwrap_or_else(|_| Self::DEFAULT_BUCKET.to_string());

        let public_bucket = env::var("STORAGE_PUBLIC_BUCKET")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .map_err(|_| "STORAGE_PUBLIC_BUCKET must be true or false".to_string())?;

        let local_root = env::var("LOCAL_STORAGE_DIR")
            .unwrap_or_else(|_| Self::DEFAULT_LOCAL_ROOT.to_string())
            .into();

        let signed_url_expiry_secs = env::var("STORAGE_SIGNED_URL_EXPIRY_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_SIGNED_URL_EXPIRY_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "STORAGE_SIGNED_URL_EXPIRY_SECS must be a valid number".to_string())?;

        Ok(Self {
            endpoint,
            service_key,
            bucket,
            public_bucket,
            local_root,
            signed_url_expiry_secs,
        })
    }

    /// Local-only configuration rooted at `local_root`
    #[cfg(test)]
    pub fn local(local_root: impl Into<PathBuf>) -> Self {
        Self {
            endpoint: None,
            service_key: None,
            bucket: Self::DEFAULT_BUCKET.to_string(),
            public_bucket: false,
            local_root: local_root.into(),
            signed_url_expiry_secs: Self::DEFAULT_SIGNED_URL_EXPIRY_SECS,
        }
    }

    /// Endpoint and service key, when both are configured
    pub fn hosted_credentials(&self) -> Option<(&str, &str)> {
        match (&self.endpoint, &self.service_key) {
            (Some(endpoint), Some(key)) => Some((endpoint.as_str(), key.as_str())),
            _ => None,
        }
    }
}
