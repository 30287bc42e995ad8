//! S3-compatible object storage via `aws-sdk-s3`.
//!
//! Configuration is loaded from environment variables; if `S3_BUCKET` is not
//! set, [`S3Config::from_env`] returns `None` and uploads fail with
//! [`StorageError::NotConfigured`].

use std::path::Path;

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use rms_core::error::CoreError;

use crate::store::ObjectStore;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object storage is not configured")]
    NotConfigured,

    #[error("Failed to read upload: {0}")]
    Read(String),

    #[error("Failed to store object '{key}': {message}")]
    Put { key: String, message: String },

    #[error("Failed to delete object '{key}': {message}")]
    Delete { key: String, message: String },
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        CoreError::Upstream(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// S3Config
// ---------------------------------------------------------------------------

const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible services (MinIO, R2, ...).
    pub endpoint: Option<String>,
    /// Base URL under which stored objects are publicly reachable.
    pub public_url: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl S3Config {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `S3_BUCKET` is not set.
    ///
    /// | Variable               | Required | Default      |
    /// |------------------------|----------|--------------|
    /// | `S3_BUCKET`            | yes      | -            |
    /// | `S3_REGION`            | no       | `us-east-1`  |
    /// | `S3_ENDPOINT`          | no       | AWS          |
    /// | `S3_PUBLIC_URL`        | no       | derived      |
    /// | `S3_ACCESS_KEY_ID`     | no       | SDK chain    |
    /// | `S3_SECRET_ACCESS_KEY` | no       | SDK chain    |
    pub fn from_env() -> Option<Self> {
        let bucket = std::env::var("S3_BUCKET").ok().filter(|b| !b.is_empty())?;
        Some(Self {
            bucket,
            region: std::env::var("S3_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string()),
            endpoint: std::env::var("S3_ENDPOINT").ok(),
            public_url: std::env::var("S3_PUBLIC_URL").ok(),
            access_key_id: std::env::var("S3_ACCESS_KEY_ID").ok(),
            secret_access_key: std::env::var("S3_SECRET_ACCESS_KEY").ok(),
        })
    }

    /// Public URL of the object stored under `key`.
    pub fn object_url(&self, key: &str) -> String {
        if let Some(base) = &self.public_url {
            return format!("{}/{key}", base.trim_end_matches('/'));
        }
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}/{key}", endpoint.trim_end_matches('/'), self.bucket),
            None => format!("https://{}.s3.{}.amazonaws.com/{key}", self.bucket, self.region),
        }
    }
}

// ---------------------------------------------------------------------------
// S3Storage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    config: S3Config,
}

impl S3Storage {
    pub async fn connect(config: S3Config) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let (Some(id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(
                id.clone(),
                secret.clone(),
                None,
                None,
                "rms-env",
            ));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        tracing::info!(bucket = %config.bucket, region = %config.region, "Object storage configured");
        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            config,
        }
    }

    async fn put(
        &self,
        key: &str,
        body: ByteStream,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Put {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        tracing::info!(key, bucket = %self.config.bucket, "Object stored");
        Ok(self.config.object_url(key))
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    fn object_url(&self, key: &str) -> String {
        self.config.object_url(key)
    }

    async fn put_file(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::Read(e.to_string()))?;
        self.put(key, body, content_type).await
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        tracing::info!(key, bucket = %self.config.bucket, "Object deleted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> S3Config {
        S3Config {
            bucket: "ratings".to_string(),
            region: "eu-west-1".to_string(),
            endpoint: None,
            public_url: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }

    #[test]
    fn object_url_defaults_to_virtual_hosted_aws() {
        assert_eq!(
            config().object_url("7/receipt.pdf"),
            "https://ratings.s3.eu-west-1.amazonaws.com/7/receipt.pdf"
        );
    }

    #[test]
    fn object_url_prefers_public_url_then_endpoint() {
        let mut cfg = config();
        cfg.endpoint = Some("http://minio:9000/".to_string());
        assert_eq!(cfg.object_url("7/a.pdf"), "http://minio:9000/ratings/7/a.pdf");

        cfg.public_url = Some("https://files.example.com/".to_string());
        assert_eq!(cfg.object_url("7/a.pdf"), "https://files.example.com/7/a.pdf");
    }

    #[test]
    fn storage_errors_map_to_upstream() {
        let err: CoreError = StorageError::NotConfigured.into();
        assert!(matches!(err, CoreError::Upstream(_)));
    }
}
