use bytes::Bytes;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::error::MigrationError;
use crate::models::{
    ImageSize, MigrationSummary, PendingRecipe, PrintDimensions, RecipeResult, RecipeStatus,
};
use crate::services::image_probe::{ImageFetcher, decode_dimensions};
use crate::services::print_requirements::PrintRequirements;
use crate::services::recipe_store::RecipeStore;
use crate::services::storage::StorageService;
use crate::services::upscaler::Upscaler;
use crate::utils::storage_path;

/// Scale factor requested from the upscaler
pub const UPSCALE_FACTOR: u32 = 4;

/// Content type of uploaded print assets
pub const PRINT_CONTENT_TYPE: &str = "image/png";

/// Moves pending recipe images to the print folder, upscaling the ones
/// that are too small to print.
pub struct MigrationPipeline {
    store: Arc<dyn RecipeStore>,
    storage: Arc<dyn StorageService>,
    fetcher: Arc<dyn ImageFetcher>,
    upscaler: Arc<dyn Upscaler>,
    requirements: PrintRequirements,
}

impl MigrationPipeline {
    pub fn new(
        store: Arc<dyn RecipeStore>,
        storage: Arc<dyn StorageService>,
        fetcher: Arc<dyn ImageFetcher>,
        upscaler: Arc<dyn Upscaler>,
    ) -> Self {
        Self {
            store,
            storage,
            fetcher,
            upscaler,
            requirements: PrintRequirements::default(),
        }
    }

    pub async fn fetch_pending(&self, limit: Option<u64>) -> anyhow::Result<Vec<PendingRecipe>> {
        self.store.fetch_pending(limit).await
    }

    /// Process every pending recipe, one at a time.
    ///
    /// Per-recipe failures are recorded on the recipe and counted; only a
    /// failure to load the pending list aborts the run.
    pub async fn run(&self, limit: Option<u64>) -> anyhow::Result<MigrationSummary> {
        info!("🔎 Fetching recipes that need processing...");
        let recipes = self.fetch_pending(limit).await?;
        let total = recipes.len();
        info!("📋 Found {} recipes to process", total);

        let mut summary = MigrationSummary {
            total,
            ..Default::default()
        };

        if total == 0 {
            info!("Nothing to do!");
            return Ok(summary);
        }

        for (i, recipe) in recipes.iter().enumerate() {
            info!("[{}/{}] {}", i + 1, total, recipe.display_name());
            let result = self.process_recipe(recipe).await;
            summary.record(&result);
        }

        Ok(summary)
    }

    /// Migrate a single recipe. Never fails: errors are written to the
    /// recipe and returned in the result.
    pub async fn process_recipe(&self, recipe: &PendingRecipe) -> RecipeResult {
        info!(
            recipe_id = %recipe.id,
            group_id = ?recipe.group_id,
            "🍽️  Processing: {}",
            recipe.display_name()
        );

        match self.migrate(recipe).await {
            Ok(dimensions) => {
                info!(recipe_id = %recipe.id, "✅ Done!");
                let status = if dimensions.upscaled {
                    RecipeStatus::Upscaled
                } else {
                    RecipeStatus::Copied
                };
                RecipeResult {
                    recipe_id: recipe.id,
                    status,
                }
            }
            Err(e) => {
                error!(recipe_id = %recipe.id, stage = e.stage(), "❌ {}", e);
                let message = e.to_string();
                if let Err(mark_err) = self.store.mark_error(recipe.id, &message).await {
                    error!(
                        recipe_id = %recipe.id,
                        "Failed to record error status: {:#}",
                        mark_err
                    );
                }
                RecipeResult {
                    recipe_id: recipe.id,
                    status: RecipeStatus::Failed(message),
                }
            }
        }
    }

    async fn migrate(&self, recipe: &PendingRecipe) -> Result<PrintDimensions, MigrationError> {
        let source_url = recipe.generated_image_url.as_str();

        info!("  → Getting image dimensions...");
        let (source, original) = self.fetch_image(source_url).await?;
        info!("  → Current size: {}", original);

        let (asset, dimensions) = if self.requirements.needs_upscale(original) {
            info!(
                "  → Needs upscaling (min: {}x{})",
                self.requirements.short_edge_min(),
                self.requirements.long_edge_min()
            );
            self.upscale(source_url, original).await?
        } else {
            info!("  → Already meets requirements, copying to print folder");
            (source, PrintDimensions::copied(original))
        };

        info!("  → Uploading to print folder...");
        let print_url = self.upload_print_asset(source_url, asset).await?;

        info!("  → Updating database...");
        self.store
            .mark_ready(recipe.id, &print_url, &dimensions)
            .await
            .map_err(MigrationError::update)?;

        Ok(dimensions)
    }

    async fn upscale(
        &self,
        source_url: &str,
        original: ImageSize,
    ) -> Result<(Bytes, PrintDimensions), MigrationError> {
        info!("  → Sending to upscaler ({}x)...", UPSCALE_FACTOR);
        let started = Instant::now();
        let output_url = self
            .upscaler
            .upscale(source_url, UPSCALE_FACTOR, false)
            .await
            .map_err(MigrationError::upscale)?;
        info!("  → Upscaled in {:.1}s", started.elapsed().as_secs_f64());

        let (data, upscaled) = self.fetch_image(&output_url).await?;
        info!("  → New size: {}", upscaled);
        info!(
            "  → Effective PPI: {:.0}",
            self.requirements.effective_ppi(upscaled)
        );
        if self.requirements.needs_upscale(upscaled) {
            warn!(
                "Upscaled image {} is still below print minimum {}x{}",
                upscaled,
                self.requirements.short_edge_min(),
                self.requirements.long_edge_min()
            );
        }

        Ok((
            data,
            PrintDimensions::upscaled(upscaled, original, UPSCALE_FACTOR),
        ))
    }

    async fn fetch_image(&self, url: &str) -> Result<(Bytes, ImageSize), MigrationError> {
        let data = self.fetcher.fetch(url).await.map_err(MigrationError::fetch)?;
        let size = decode_dimensions(&data).map_err(MigrationError::decode)?;
        Ok((data, size))
    }

    /// Upload next to the source under the print prefix and return the public URL
    async fn upload_print_asset(
        &self,
        source_url: &str,
        data: Bytes,
    ) -> Result<String, MigrationError> {
        let source_key = self.storage.object_key(source_url).ok_or_else(|| {
            MigrationError::Upload(format!(
                "Source URL is not a public object of this bucket: {}",
                source_url
            ))
        })?;
        let print_key = storage_path::to_print_path(&source_key).ok_or_else(|| {
            MigrationError::Upload(format!(
                "Source key has no {} segment: {}",
                storage_path::GENERATED_PREFIX,
                source_key
            ))
        })?;

        self.storage
            .upload_file(&print_key, data, PRINT_CONTENT_TYPE)
            .await
            .map_err(MigrationError::upload)?;

        Ok(self.storage.public_url(&print_key))
    }
}
