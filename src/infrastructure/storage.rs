use crate::config::StorageConfig;
use crate::services::storage::S3StorageService;
use anyhow::Context;
use aws_sdk_s3::config::Region;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn setup_storage(config: StorageConfig) -> anyhow::Result<Arc<S3StorageService>> {
    let access_key = config
        .access_key
        .clone()
        .context("STORAGE_ACCESS_KEY must be set")?;
    let secret_key = config
        .secret_key
        .clone()
        .context("STORAGE_SECRET_KEY must be set")?;

    info!(
        "☁️  Object Storage: {} (Bucket: {})",
        config.endpoint, config.bucket
    );

    let aws_config = aws_config::from_env()
        .endpoint_url(&config.endpoint)
        .region(Region::new(config.region.clone()))
        .credentials_provider(aws_sdk_s3::config::Credentials::new(
            access_key, secret_key, None, None, "static",
        ))
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(true)
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);

    // The bucket is owned elsewhere; only report whether it is reachable
    match s3_client.head_bucket().bucket(&config.bucket).send().await {
        Ok(_) => info!("✅ Bucket '{}' is ready", config.bucket),
        Err(e) => warn!("⚠️  Bucket '{}' is not reachable yet: {}", config.bucket, e),
    }

    Ok(Arc::new(S3StorageService::new(s3_client, config)))
}
