use crate::config::MigrationConfig;
use crate::services::storage::S3StorageService;
use crate::utils::storage_path::PublicUrlLayout;
use aws_sdk_s3::config::Region;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn setup_storage(config: &MigrationConfig) -> Arc<S3StorageService> {
    let storage = &config.storage;

    info!(
        "☁️  S3 Storage: {} (Bucket: {})",
        storage.endpoint, storage.bucket
    );

    let aws_config = aws_config::from_env()
        .endpoint_url(&storage.endpoint)
        .region(Region::new(storage.region.clone()))
        .credentials_provider(aws_sdk_s3::config::Credentials::new(
            storage.access_key.clone(),
            storage.secret_key.clone(),
            None,
            None,
            "static",
        ))
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(true)
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);

    // The bucket is owned by the web application; never create it here
    match s3_client.head_bucket().bucket(&storage.bucket).send().await {
        Ok(_) => info!("✅ Bucket '{}' is ready", storage.bucket),
        Err(e) => warn!(
            "⚠️ Could not verify bucket '{}': {}. Uploads may fail.",
            storage.bucket, e
        ),
    }

    let layout = PublicUrlLayout::new(config.supabase_url.clone(), storage.bucket.clone());
    Arc::new(S3StorageService::new(s3_client, layout))
}
