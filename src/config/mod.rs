use anyhow::{Result, bail};
use std::env;
use std::time::Duration;

/// Settings for the ingestion endpoint
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Shared secret every upload must present (required, non-empty)
    pub api_key: String,

    /// Maximum request body size in bytes (default: 20 MB)
    pub max_image_size: usize,

    /// Upper bound for a single storage write or metadata insert (default: 30s)
    pub remote_timeout: Duration,

    /// How many times a metadata insert is attempted for one image (default: 2)
    pub metadata_insert_attempts: u32,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            max_image_size: 20 * 1024 * 1024, // 20 MB
            remote_timeout: Duration::from_secs(30),
            metadata_insert_attempts: 2,
        }
    }
}

impl IngestConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let default = Self::default();

        let api_key = env::var("INGEST_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            bail!("INGEST_API_KEY must be set to a non-empty value");
        }

        Ok(Self {
            api_key,

            max_image_size: env::var("MAX_IMAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_image_size),

            remote_timeout: env::var("REMOTE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.remote_timeout),

            metadata_insert_attempts: env::var("METADATA_INSERT_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &u32| *n > 0)
                .unwrap_or(default.metadata_insert_attempts),
        })
    }

    /// Config for local runs and tests: fixed key, short timeout
    pub fn development(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            remote_timeout: Duration::from_secs(5),
            ..Self::default()
        }
    }
}

/// Object storage location and credentials
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// S3-compatible endpoint (default: Google Cloud Storage interoperability API)
    pub endpoint: String,

    pub region: String,

    pub access_key: Option<String>,
    pub secret_key: Option<String>,

    /// Bucket every image blob is written to (default: "image-ingest")
    pub bucket: String,

    /// Scheme used when rendering blob URIs (default: "gs")
    pub uri_scheme: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://storage.googleapis.com".to_string(),
            region: "auto".to_string(),
            access_key: None,
            secret_key: None,
            bucket: "image-ingest".to_string(),
            uri_scheme: "gs".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            endpoint: env::var("STORAGE_ENDPOINT").unwrap_or(default.endpoint),
            region: env::var("STORAGE_REGION").unwrap_or(default.region),
            access_key: env::var("STORAGE_ACCESS_KEY").ok(),
            secret_key: env::var("STORAGE_SECRET_KEY").ok(),
            bucket: env::var("STORAGE_BUCKET").unwrap_or(default.bucket),
            uri_scheme: env::var("STORAGE_URI_SCHEME").unwrap_or(default.uri_scheme),
        }
    }

    /// `gs://bucket/key` style URI for a blob in the configured bucket
    pub fn object_uri(&self, key: &str) -> String {
        format!("{}://{}/{}", self.uri_scheme, self.bucket, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ingest_config() {
        let config = IngestConfig::default();
        assert_eq!(config.max_image_size, 20 * 1024 * 1024);
        assert_eq!(config.remote_timeout, Duration::from_secs(30));
        assert_eq!(config.metadata_insert_attempts, 2);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_development_config() {
        let config = IngestConfig::development("dev-key");
        assert_eq!(config.api_key, "dev-key");
        assert_eq!(config.remote_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_env_requires_api_key() {
        unsafe { env::remove_var("INGEST_API_KEY") };
        assert!(IngestConfig::from_env().is_err());
    }

    #[test]
    fn test_object_uri() {
        let config = StorageConfig {
            bucket: "uploads".to_string(),
            ..StorageConfig::default()
        };
        assert_eq!(
            config.object_uri("reddit_abc123.jpg"),
            "gs://uploads/reddit_abc123.jpg"
        );
    }
}
