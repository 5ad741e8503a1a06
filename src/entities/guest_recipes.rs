use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recipe submitted by a guest. Only the columns touched by the print
/// migration are mapped.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "guest_recipes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub recipe_name: Option<String>,
    pub generated_image_url: Option<String>,
    pub group_id: Option<Uuid>,
    pub image_upscale_status: String,
    pub generated_image_url_print: Option<String>,
    pub image_dimensions: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
