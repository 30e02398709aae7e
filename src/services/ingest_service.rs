use crate::api::error::AppError;
use crate::config::IngestConfig;
use crate::entities::image_metadata;
use crate::services::metadata::MetadataRepository;
use crate::services::storage::StorageService;
use crate::utils::validation::{blob_name, decode_image_data, normalize_platform};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

pub const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UploadRequest {
    /// Base64-encoded image bytes
    pub image_data: Option<String>,
    /// Source platform label, "unknown" when omitted
    pub platform: Option<String>,
    pub api_key: Option<String>,
    /// Capture time; ingestion time when omitted
    pub captured_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct IngestReceipt {
    pub image_id: String,
    pub gcs_url: String,
}

pub struct IngestService {
    storage: Arc<dyn StorageService>,
    metadata: MetadataRepository,
    config: IngestConfig,
}

impl IngestService {
    pub fn new(
        storage: Arc<dyn StorageService>,
        metadata: MetadataRepository,
        config: IngestConfig,
    ) -> Self {
        Self {
            storage,
            metadata,
            config,
        }
    }

    pub fn check_api_key(&self, presented: Option<&str>) -> Result<(), AppError> {
        let presented = presented.ok_or(AppError::Unauthorized)?;
        // Compare digests so the comparison time does not depend on the prefix match
        let expected = Sha256::digest(self.config.api_key.as_bytes());
        let actual = Sha256::digest(presented.as_bytes());
        if self.config.api_key.is_empty() || expected != actual {
            return Err(AppError::Unauthorized);
        }
        Ok(())
    }

    /// Entry point for a raw request body. The key is read and checked before
    /// the other fields are typed, so a request without the right key is
    /// always a 401 however malformed the rest of it is.
    pub async fn ingest_body(&self, body: &[u8]) -> Result<IngestReceipt, AppError> {
        // Empty or unparseable bodies carry no key
        let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
        self.check_api_key(value.get("api_key").and_then(Value::as_str))?;

        let req: UploadRequest = serde_json::from_value(value)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?;
        self.ingest(req).await
    }

    /// Authenticates, stores the blob, then records its metadata row.
    /// Nothing is written unless the key and payload are valid.
    pub async fn ingest(&self, req: UploadRequest) -> Result<IngestReceipt, AppError> {
        self.check_api_key(req.api_key.as_deref())?;

        let platform = normalize_platform(req.platform.as_deref())
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let bytes = decode_image_data(req.image_data.as_deref())
            .map_err(|e| AppError::Decode(e.to_string()))?;

        let image_id = Uuid::new_v4().to_string();
        let key = blob_name(&platform, &image_id);

        self.with_timeout(
            "writing image blob",
            self.storage.upload_file(&key, bytes, IMAGE_CONTENT_TYPE),
        )
        .await?
        .map_err(AppError::StorageWrite)?;

        let gcs_url = self.storage.object_uri(&key);
        info!("🖼️  Stored image {} at {}", image_id, gcs_url);

        let record = image_metadata::Model {
            image_id: image_id.clone(),
            gcs_url: gcs_url.clone(),
            captured_at: req.captured_at.unwrap_or_else(Utc::now),
            platform_name: Some(platform),
            is_ai_gen: None,
        };

        if let Err(e) = self.insert_metadata(&record).await {
            error!(
                image_id = %record.image_id,
                gcs_url = %record.gcs_url,
                "❌ Blob stored but metadata row missing (orphaned blob): {}",
                e
            );
            return Err(e);
        }

        Ok(IngestReceipt { image_id, gcs_url })
    }

    /// Inserts the row, retrying with the same `image_id`. A row found by id
    /// after a failed attempt means an earlier attempt did land.
    async fn insert_metadata(&self, record: &image_metadata::Model) -> Result<(), AppError> {
        let attempts = self.config.metadata_insert_attempts.max(1);
        let mut attempt = 1;

        loop {
            let err = match self
                .with_timeout("recording image metadata", self.metadata.insert(record))
                .await
            {
                Ok(Ok(())) => return Ok(()),
                Ok(Err(db_err)) => AppError::MetadataWrite(db_err),
                Err(timed_out) => timed_out,
            };

            if attempt >= attempts {
                return Err(err);
            }

            warn!(
                "⚠️  Metadata insert attempt {}/{} for {} failed: {}",
                attempt, attempts, record.image_id, err
            );

            if let Ok(Ok(Some(_))) = self
                .with_timeout("looking up image metadata", self.metadata.find(&record.image_id))
                .await
            {
                info!("Metadata row for {} already present", record.image_id);
                return Ok(());
            }

            tokio::time::sleep(Duration::from_millis(100 * u64::from(attempt))).await;
            attempt += 1;
        }
    }

    async fn with_timeout<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = T>,
    ) -> Result<T, AppError> {
        let limit = self.config.remote_timeout;
        timeout(limit, fut).await.map_err(|_| AppError::Timeout {
            operation,
            elapsed: limit,
        })
    }
}
