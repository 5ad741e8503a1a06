#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, GrayImage, ImageFormat};
use print_upscale_migration::entities::guest_recipes;
use print_upscale_migration::infrastructure::database;
use print_upscale_migration::models::{PendingRecipe, PrintDimensions, UpscaleStatus};
use print_upscale_migration::services::image_probe::ImageFetcher;
use print_upscale_migration::services::recipe_store::{RecipeStore, SeaOrmRecipeStore};
use print_upscale_migration::services::storage::StorageService;
use print_upscale_migration::services::upscaler::Upscaler;
use print_upscale_migration::utils::storage_path::PublicUrlLayout;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;
use uuid::Uuid;

pub const BASE_URL: &str = "https://project.supabase.co";
pub const BUCKET: &str = "recipes";

pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();
    db
}

pub fn layout() -> PublicUrlLayout {
    PublicUrlLayout::new(BASE_URL, BUCKET)
}

pub fn source_url(key: &str) -> String {
    layout().public_url(key)
}

pub fn png_bytes(width: u32, height: u32) -> Bytes {
    let mut out = Vec::new();
    DynamicImage::ImageLuma8(GrayImage::new(width, height))
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    Bytes::from(out)
}

pub async fn insert_recipe(
    db: &DatabaseConnection,
    name: &str,
    image_url: Option<&str>,
    status: UpscaleStatus,
) -> Uuid {
    let id = Uuid::new_v4();
    guest_recipes::ActiveModel {
        id: Set(id),
        recipe_name: Set(Some(name.to_string())),
        generated_image_url: Set(image_url.map(str::to_string)),
        group_id: Set(Some(Uuid::new_v4())),
        image_upscale_status: Set(status.to_string()),
        generated_image_url_print: Set(None),
        image_dimensions: Set(None),
    }
    .insert(db)
    .await
    .unwrap();
    id
}

/// In-memory blob store keyed by object key
pub struct MockStorageService {
    layout: PublicUrlLayout,
    pub files: Mutex<HashMap<String, (Bytes, String)>>,
    pub fail_uploads: bool,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self {
            layout: layout(),
            files: Mutex::new(HashMap::new()),
            fail_uploads: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Self::new()
        }
    }

    pub fn get(&self, key: &str) -> Option<(Bytes, String)> {
        self.files.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn upload_file(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> anyhow::Result<()> {
        if self.fail_uploads {
            return Err(anyhow::anyhow!("storage unavailable"));
        }
        self.files
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.layout.public_url(key)
    }

    fn object_key(&self, url: &str) -> Option<String> {
        self.layout.object_key(url)
    }
}

/// Serves registered byte payloads by URL; anything else is unreachable
pub struct MockImageFetcher {
    images: Mutex<HashMap<String, Bytes>>,
    pub requests: Mutex<Vec<String>>,
}

impl MockImageFetcher {
    pub fn new() -> Self {
        Self {
            images: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn serve(&self, url: &str, data: Bytes) {
        self.images.lock().unwrap().insert(url.to_string(), data);
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageFetcher for MockImageFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<Bytes> {
        self.requests.lock().unwrap().push(url.to_string());
        self.images
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("GET {} returned 404 Not Found", url))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpscaleCall {
    pub image_url: String,
    pub scale: u32,
    pub face_enhance: bool,
}

/// Returns a fixed output URL, or fails every call
pub struct MockUpscaler {
    output_url: Option<String>,
    pub calls: Mutex<Vec<UpscaleCall>>,
}

impl MockUpscaler {
    pub fn returning(output_url: &str) -> Self {
        Self {
            output_url: Some(output_url.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            output_url: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<UpscaleCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upscaler for MockUpscaler {
    async fn upscale(
        &self,
        image_url: &str,
        scale: u32,
        face_enhance: bool,
    ) -> anyhow::Result<String> {
        self.calls.lock().unwrap().push(UpscaleCall {
            image_url: image_url.to_string(),
            scale,
            face_enhance,
        });
        self.output_url
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Prediction p1 failed: CUDA out of memory"))
    }
}

/// SeaORM store whose `mark_ready` always fails; error writes still land
pub struct ReadyFailingStore {
    inner: SeaOrmRecipeStore,
    pub errors: Mutex<Vec<String>>,
}

impl ReadyFailingStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            inner: SeaOrmRecipeStore::new(db),
            errors: Mutex::new(Vec::new()),
        }
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecipeStore for ReadyFailingStore {
    async fn fetch_pending(&self, limit: Option<u64>) -> anyhow::Result<Vec<PendingRecipe>> {
        self.inner.fetch_pending(limit).await
    }

    async fn mark_ready(
        &self,
        _recipe_id: Uuid,
        _print_url: &str,
        _dimensions: &PrintDimensions,
    ) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("connection reset"))
    }

    async fn mark_error(&self, recipe_id: Uuid, message: &str) -> anyhow::Result<()> {
        self.errors.lock().unwrap().push(message.to_string());
        self.inner.mark_error(recipe_id, message).await
    }
}
