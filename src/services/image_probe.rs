use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::io::Cursor;

use crate::models::ImageSize;

/// Downloads image bytes by URL
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("GET {} returned {}", url, status));
        }

        let data = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body of {}", url))?;
        tracing::debug!("Fetched {} bytes from {}", data.len(), url);
        Ok(data)
    }
}

/// Read image dimensions from the header without decoding pixel data.
pub fn decode_dimensions(data: &[u8]) -> Result<ImageSize> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .context("Failed to sniff image format")?;

    if reader.format().is_none() {
        return Err(anyhow!("Unrecognized image format"));
    }

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| anyhow!("Failed to read image dimensions: {}", e))?;
    Ok(ImageSize::new(width, height))
}
