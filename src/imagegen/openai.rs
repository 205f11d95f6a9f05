//! OpenAI Images API backend.

use async_trait::async_trait;
use base64::Engine as _;
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::config::ImageGenConfig;
use crate::error::GenerationError;
use crate::imagegen::ImageGenerator;

const IMAGES_ENDPOINT: &str = "https://api.openai.com/v1/images/generations";

/// Images API client.
pub struct OpenAiImageClient {
    config: ImageGenConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
}

impl OpenAiImageClient {
    pub fn new(config: ImageGenConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, GenerationError> {
        let api_key = self.config.api_key()?;

        let request = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "size": self.config.size,
            "quality": self.config.quality,
            "response_format": "b64_json",
        });

        let resp = self
            .client
            .post(IMAGES_ENDPOINT)
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::RequestFailed {
                provider: "openai".into(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::RequestFailed {
                provider: "openai".into(),
                reason: format!("images request failed ({status}): {body}"),
            });
        }

        let images: ImagesResponse =
            resp.json().await.map_err(|e| GenerationError::InvalidResponse {
                provider: "openai".into(),
                reason: e.to_string(),
            })?;

        let encoded = images
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .ok_or(GenerationError::Empty)?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| GenerationError::InvalidResponse {
                provider: "openai".into(),
                reason: format!("bad b64_json payload: {e}"),
            })?;

        tracing::debug!(bytes = bytes.len(), "image generated");
        Ok(bytes)
    }
}
