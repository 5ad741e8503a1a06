use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

/// Shared HTTP client for image downloads and upscaler API calls
pub fn build_http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
        .context("Failed to create HTTP client")
}
