use anyhow::{Result, anyhow};
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::{guest_recipes, prelude::*};
use crate::models::{PendingRecipe, PrintDimensions, UpscaleOutcome, UpscaleStatus};

/// Persistence for recipe print migration state
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Pending recipes with a source image, in store order
    async fn fetch_pending(&self, limit: Option<u64>) -> Result<Vec<PendingRecipe>>;

    async fn mark_ready(
        &self,
        recipe_id: Uuid,
        print_url: &str,
        dimensions: &PrintDimensions,
    ) -> Result<()>;

    async fn mark_error(&self, recipe_id: Uuid, message: &str) -> Result<()>;
}

pub struct SeaOrmRecipeStore {
    db: DatabaseConnection,
}

impl SeaOrmRecipeStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn save_outcome(
        &self,
        recipe_id: Uuid,
        print_url: Option<&str>,
        outcome: UpscaleOutcome,
    ) -> Result<()> {
        let mut active = guest_recipes::ActiveModel {
            id: Set(recipe_id),
            image_upscale_status: Set(outcome.status().to_string()),
            image_dimensions: Set(Some(serde_json::to_value(&outcome)?)),
            ..Default::default()
        };
        if let Some(url) = print_url {
            active.generated_image_url_print = Set(Some(url.to_string()));
        }

        match active.update(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(anyhow!("Recipe {} not found", recipe_id)),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl RecipeStore for SeaOrmRecipeStore {
    async fn fetch_pending(&self, limit: Option<u64>) -> Result<Vec<PendingRecipe>> {
        let mut query = GuestRecipes::find()
            .select_only()
            .columns([
                guest_recipes::Column::Id,
                guest_recipes::Column::RecipeName,
                guest_recipes::Column::GeneratedImageUrl,
                guest_recipes::Column::GroupId,
            ])
            .filter(guest_recipes::Column::ImageUpscaleStatus.eq(UpscaleStatus::Pending.as_str()))
            .filter(guest_recipes::Column::GeneratedImageUrl.is_not_null());

        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let recipes = query.into_model::<PendingRecipe>().all(&self.db).await?;
        tracing::debug!("Fetched {} pending recipes", recipes.len());
        Ok(recipes)
    }

    async fn mark_ready(
        &self,
        recipe_id: Uuid,
        print_url: &str,
        dimensions: &PrintDimensions,
    ) -> Result<()> {
        self.save_outcome(
            recipe_id,
            Some(print_url),
            UpscaleOutcome::Success(dimensions.clone()),
        )
        .await
    }

    async fn mark_error(&self, recipe_id: Uuid, message: &str) -> Result<()> {
        self.save_outcome(
            recipe_id,
            None,
            UpscaleOutcome::Failure {
                error: message.to_string(),
            },
        )
        .await
    }
}
