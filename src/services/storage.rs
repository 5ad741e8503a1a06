use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

use crate::utils::storage_path::PublicUrlLayout;

/// Blob store holding recipe images.
///
/// Uploads overwrite any existing object at the same key.
#[async_trait]
pub trait StorageService: Send + Sync {
    async fn upload_file(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;

    /// Public URL under which `key` is served
    fn public_url(&self, key: &str) -> String;

    /// Inverse of [`StorageService::public_url`]
    fn object_key(&self, url: &str) -> Option<String>;
}

pub struct S3StorageService {
    client: Client,
    layout: PublicUrlLayout,
}

impl S3StorageService {
    pub fn new(client: Client, layout: PublicUrlLayout) -> Self {
        Self { client, layout }
    }
}

#[async_trait]
impl StorageService for S3StorageService {
    async fn upload_file(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        let size = data.len();
        let res = self
            .client
            .put_object()
            .bucket(self.layout.bucket())
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await;

        if let Err(e) = res {
            tracing::error!(
                "S3 put_object failed: bucket={}, key={}, error={:?}",
                self.layout.bucket(),
                key,
                e
            );
            return Err(e.into());
        }

        tracing::debug!("Uploaded {} bytes to {}/{}", size, self.layout.bucket(), key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.layout.public_url(key)
    }

    fn object_key(&self, url: &str) -> Option<String> {
        self.layout.object_key(url)
    }
}
