use anyhow::{Result, anyhow};
use std::env;

/// Real-ESRGAN model version pinned for print upscaling
pub const DEFAULT_REPLICATE_MODEL_VERSION: &str =
    "f121d640bd286e1fdc67f9799164c1d5be36ff74576ee11c803ae5b665dd46aa";

/// Configuration for the print upscale migration
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Postgres connection string for the recipe database
    pub database_url: String,

    /// Public base URL of the Supabase project (used to build public object URLs)
    pub supabase_url: String,

    /// Timeout applied to every outbound HTTP request, in seconds (default: 120)
    pub http_timeout_secs: u64,

    pub storage: StorageConfig,
    pub replicate: ReplicateConfig,
}

/// S3-compatible access to the recipe image bucket
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// S3 endpoint (default: "<supabase_url>/storage/v1/s3")
    pub endpoint: String,
    /// Region reported to the S3 endpoint (default: "us-east-1")
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    /// Bucket holding generated and print images (default: "recipes")
    pub bucket: String,
}

/// Replicate prediction API settings
#[derive(Debug, Clone)]
pub struct ReplicateConfig {
    pub api_token: String,
    /// API root (default: "https://api.replicate.com/v1")
    pub api_url: String,
    pub model_version: String,
    /// Delay between prediction status checks, in seconds (default: 2)
    pub poll_interval_secs: u64,
    /// Status checks before giving up on a prediction (default: 300)
    pub max_polls: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            region: "us-east-1".to_string(),
            access_key: String::new(),
            secret_key: String::new(),
            bucket: "recipes".to_string(),
        }
    }
}

impl Default for ReplicateConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            api_url: "https://api.replicate.com/v1".to_string(),
            model_version: DEFAULT_REPLICATE_MODEL_VERSION.to_string(),
            poll_interval_secs: 2,
            max_polls: 300,
        }
    }
}

impl MigrationConfig {
    pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let supabase_url = required("NEXT_PUBLIC_SUPABASE_URL")?
            .trim_end_matches('/')
            .to_string();
        let storage_default = StorageConfig::default();
        let replicate_default = ReplicateConfig::default();

        Ok(Self {
            database_url: required("DATABASE_URL")?,

            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(Self::DEFAULT_HTTP_TIMEOUT_SECS),

            storage: StorageConfig {
                endpoint: env::var("STORAGE_S3_ENDPOINT")
                    .unwrap_or_else(|_| format!("{}/storage/v1/s3", supabase_url)),
                region: env::var("STORAGE_S3_REGION").unwrap_or(storage_default.region),
                access_key: required("STORAGE_S3_ACCESS_KEY")?,
                secret_key: required("STORAGE_S3_SECRET_KEY")?,
                bucket: env::var("STORAGE_BUCKET").unwrap_or(storage_default.bucket),
            },

            replicate: ReplicateConfig {
                api_token: required("REPLICATE_API_TOKEN")?,
                api_url: env::var("REPLICATE_API_URL")
                    .map(|v| v.trim_end_matches('/').to_string())
                    .unwrap_or(replicate_default.api_url),
                model_version: env::var("REPLICATE_MODEL_VERSION")
                    .unwrap_or(replicate_default.model_version),
                poll_interval_secs: env::var("UPSCALE_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(replicate_default.poll_interval_secs),
                max_polls: env::var("UPSCALE_MAX_POLLS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(replicate_default.max_polls),
            },

            supabase_url,
        })
    }
}

fn required(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(anyhow!("{} must be set", name)),
    }
}
