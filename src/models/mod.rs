use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Value of `guest_recipes.image_upscale_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpscaleStatus {
    Pending,
    Ready,
    Error,
}

impl UpscaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpscaleStatus::Pending => "pending",
            UpscaleStatus::Ready => "ready",
            UpscaleStatus::Error => "error",
        }
    }
}

impl fmt::Display for UpscaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel dimensions of a decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Dimensions recorded for a print-ready image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintDimensions {
    pub width: u32,
    pub height: u32,
    pub original_width: u32,
    pub original_height: u32,
    pub upscaled: bool,
    pub upscale_factor: u32,
}

impl PrintDimensions {
    pub fn upscaled(new: ImageSize, original: ImageSize, factor: u32) -> Self {
        Self {
            width: new.width,
            height: new.height,
            original_width: original.width,
            original_height: original.height,
            upscaled: true,
            upscale_factor: factor,
        }
    }

    /// Source already meets print requirements and is copied as-is.
    pub fn copied(original: ImageSize) -> Self {
        Self {
            width: original.width,
            height: original.height,
            original_width: original.width,
            original_height: original.height,
            upscaled: false,
            upscale_factor: 1,
        }
    }
}

/// Result stored in `guest_recipes.image_dimensions`.
///
/// Serialized untagged so the column keeps the shape the web app reads:
/// the dimensions object on success, `{"error": "..."}` on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UpscaleOutcome {
    Success(PrintDimensions),
    Failure { error: String },
}

impl UpscaleOutcome {
    pub fn status(&self) -> UpscaleStatus {
        match self {
            UpscaleOutcome::Success(_) => UpscaleStatus::Ready,
            UpscaleOutcome::Failure { .. } => UpscaleStatus::Error,
        }
    }
}

/// Projection of a recipe awaiting print migration
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct PendingRecipe {
    pub id: Uuid,
    pub recipe_name: Option<String>,
    pub generated_image_url: String,
    pub group_id: Option<Uuid>,
}

impl PendingRecipe {
    pub fn display_name(&self) -> &str {
        self.recipe_name.as_deref().unwrap_or("(untitled)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeStatus {
    Upscaled,
    /// Met print requirements and was copied without upscaling
    Copied,
    Failed(String),
}

/// Outcome of processing one recipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeResult {
    pub recipe_id: Uuid,
    pub status: RecipeStatus,
}

impl RecipeResult {
    pub fn is_success(&self) -> bool {
        !matches!(self.status, RecipeStatus::Failed(_))
    }

    /// Whether upscaling was applied; `None` when processing failed.
    pub fn upscaled(&self) -> Option<bool> {
        match self.status {
            RecipeStatus::Upscaled => Some(true),
            RecipeStatus::Copied => Some(false),
            RecipeStatus::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            RecipeStatus::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Aggregate counters for a migration run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub upscaled: usize,
    pub copied: usize,
}

impl MigrationSummary {
    pub fn record(&mut self, result: &RecipeResult) {
        match result.upscaled() {
            Some(true) => {
                self.succeeded += 1;
                self.upscaled += 1;
            }
            Some(false) => {
                self.succeeded += 1;
                self.copied += 1;
            }
            None => self.failed += 1,
        }
    }
}
