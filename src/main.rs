use chrono::Local;
use clap::Parser;
use dotenvy::dotenv;
use print_upscale_migration::config::MigrationConfig;
use print_upscale_migration::infrastructure::{database, http, storage};
use print_upscale_migration::services::image_probe::HttpImageFetcher;
use print_upscale_migration::services::migration::UPSCALE_FACTOR;
use print_upscale_migration::services::recipe_store::SeaOrmRecipeStore;
use print_upscale_migration::services::upscaler::ReplicateUpscaler;
use print_upscale_migration::MigrationPipeline;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Set to Some(n) to only process n recipes
const DEFAULT_LIMIT: Option<u64> = None;

#[derive(Parser, Debug)]
#[command(author, version, about = "Migrate recipe images to print-ready resolution", long_about = None)]
struct Args {
    /// Only process this many pending recipes (test runs)
    #[arg(short, long)]
    limit: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment & Logging Setup
    dotenvy::from_filename(".env.local").ok();
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "print_upscale_migration=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = MigrationConfig::from_env()?;
    let limit = args.limit.or(DEFAULT_LIMIT);

    info!("🖨️  Recipe Image Upscaling Migration");
    info!("Upscale factor: {}x", UPSCALE_FACTOR);
    if let Some(limit) = limit {
        warn!("⚠️  TEST MODE: only {} recipes", limit);
    }
    let started_at = Local::now();
    info!("Started at: {}", started_at.format("%Y-%m-%d %H:%M:%S"));

    // 2. Setup Infrastructure
    let db = database::setup_database(&config.database_url).await?;
    let storage_service = storage::setup_storage(&config).await;
    let http_client = http::build_http_client(config.http_timeout_secs)?;

    let pipeline = MigrationPipeline::new(
        Arc::new(SeaOrmRecipeStore::new(db)),
        storage_service,
        Arc::new(HttpImageFetcher::new(http_client.clone())),
        Arc::new(ReplicateUpscaler::new(http_client, &config.replicate)),
    );

    // 3. Run
    let summary = pipeline.run(limit).await?;

    info!("🏁 MIGRATION COMPLETE");
    info!("Total processed: {}", summary.total);
    info!("  ✓ Successful: {}", summary.succeeded);
    info!("    - Upscaled ({}x): {}", UPSCALE_FACTOR, summary.upscaled);
    info!("    - Copied (already good): {}", summary.copied);
    info!("  ✗ Failed: {}", summary.failed);
    info!(
        "Finished at: {} ({:.1}s)",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        (Local::now() - started_at).num_milliseconds() as f64 / 1000.0
    );

    Ok(())
}
