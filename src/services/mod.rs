pub mod image_probe;
pub mod migration;
pub mod print_requirements;
pub mod recipe_store;
pub mod storage;
pub mod upscaler;
