use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::ReplicateConfig;

/// Remote super-resolution model.
///
/// Implementations block until the output image is available and return
/// its URL.
#[async_trait]
pub trait Upscaler: Send + Sync {
    async fn upscale(&self, image_url: &str, scale: u32, face_enhance: bool) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: PredictionStatus,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl Prediction {
    /// Real-ESRGAN returns a single URL; some models return a list of them.
    fn output_url(&self) -> Option<String> {
        match self.output.as_ref()? {
            Value::String(url) => Some(url.clone()),
            Value::Array(items) => items.first()?.as_str().map(str::to_string),
            _ => None,
        }
    }

    fn error_message(&self) -> String {
        match &self.error {
            Some(Value::String(message)) => message.clone(),
            Some(Value::Null) | None => "Unknown error".to_string(),
            Some(other) => other.to_string(),
        }
    }
}

/// Real-ESRGAN upscaling through the Replicate predictions API
pub struct ReplicateUpscaler {
    http_client: Client,
    api_url: String,
    api_token: String,
    model_version: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl ReplicateUpscaler {
    pub fn new(http_client: Client, config: &ReplicateConfig) -> Self {
        Self {
            http_client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            model_version: config.model_version.clone(),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            max_polls: config.max_polls,
        }
    }

    /// Override the delay between status checks
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    async fn create_prediction(
        &self,
        image_url: &str,
        scale: u32,
        face_enhance: bool,
    ) -> Result<Prediction> {
        let url = format!("{}/predictions", self.api_url);
        let body = json!({
            "version": self.model_version,
            "input": {
                "image": image_url,
                "scale": scale,
                "face_enhance": face_enhance,
            }
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .context("Failed to create Replicate prediction")?;

        Self::parse_prediction(response, "prediction create").await
    }

    async fn get_prediction(&self, id: &str) -> Result<Prediction> {
        let url = format!("{}/predictions/{}", self.api_url, id);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .context("Failed to poll Replicate prediction")?;

        Self::parse_prediction(response, "prediction status check").await
    }

    async fn parse_prediction(response: reqwest::Response, action: &str) -> Result<Prediction> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!(
                "Replicate {} failed: {} - {}",
                action,
                status,
                error_text
            ));
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse Replicate {} response", action))
    }

    /// Poll until the prediction reaches a terminal state
    async fn wait_for(&self, mut prediction: Prediction) -> Result<Prediction> {
        let mut attempts = 0;

        loop {
            match prediction.status {
                PredictionStatus::Succeeded => return Ok(prediction),
                PredictionStatus::Failed => {
                    return Err(anyhow!(
                        "Prediction {} failed: {}",
                        prediction.id,
                        prediction.error_message()
                    ));
                }
                PredictionStatus::Canceled => {
                    return Err(anyhow!("Prediction {} was canceled", prediction.id));
                }
                PredictionStatus::Starting
                | PredictionStatus::Processing
                | PredictionStatus::Unknown => {
                    if attempts >= self.max_polls {
                        return Err(anyhow!(
                            "Prediction {} timed out after {} status checks",
                            prediction.id,
                            self.max_polls
                        ));
                    }
                    attempts += 1;
                    sleep(self.poll_interval).await;
                    prediction = self.get_prediction(&prediction.id).await?;
                }
            }
        }
    }
}

#[async_trait]
impl Upscaler for ReplicateUpscaler {
    async fn upscale(&self, image_url: &str, scale: u32, face_enhance: bool) -> Result<String> {
        let prediction = self
            .create_prediction(image_url, scale, face_enhance)
            .await?;
        tracing::debug!(prediction_id = %prediction.id, "Replicate prediction created");

        let prediction = self.wait_for(prediction).await?;
        prediction
            .output_url()
            .ok_or_else(|| anyhow!("Prediction {} returned no output URL", prediction.id))
    }
}
