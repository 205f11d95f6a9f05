//! WhatsApp Business channel — replies via the Meta Graph API.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::config::WhatsAppConfig;
use crate::error::ChannelError;
use crate::messaging::Messenger;

/// Graph API version pin.
const GRAPH_API_BASE: &str = "https://graph.facebook.com/v19.0";

/// Graph API client for one WhatsApp Business sender account.
pub struct WhatsAppClient {
    config: WhatsAppConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct MediaUploadResponse {
    id: String,
}

impl WhatsAppClient {
    pub fn new(config: WhatsAppConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, phone_number_id: &str, path: &str) -> String {
        format!("{GRAPH_API_BASE}/{phone_number_id}/{path}")
    }

    /// POST a JSON payload to the `/messages` endpoint.
    async fn post_message(&self, payload: serde_json::Value) -> Result<(), ChannelError> {
        let (token, phone_number_id) = self.config.credentials()?;

        let resp = self
            .client
            .post(self.api_url(phone_number_id, "messages"))
            .bearer_auth(token.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "whatsapp".into(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: "whatsapp".into(),
                reason: format!("messages request failed ({status}): {body}"),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Messenger for WhatsAppClient {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn send_text(&self, to: &str, body: &str) -> Result<(), ChannelError> {
        self.post_message(serde_json::json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "text",
            "text": {"preview_url": false, "body": body},
        }))
        .await?;

        tracing::debug!(to, "WhatsApp text sent");
        Ok(())
    }

    async fn upload_image(
        &self,
        image: Vec<u8>,
        filename: &str,
    ) -> Result<String, ChannelError> {
        let (token, phone_number_id) = self.config.credentials()?;

        let part = Part::bytes(image)
            .file_name(filename.to_string())
            .mime_str("image/png")
            .map_err(|e| ChannelError::UploadFailed {
                name: "whatsapp".into(),
                reason: e.to_string(),
            })?;
        let form = Form::new()
            .text("messaging_product", "whatsapp")
            .part("file", part);

        let resp = self
            .client
            .post(self.api_url(phone_number_id, "media"))
            .bearer_auth(token.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ChannelError::UploadFailed {
                name: "whatsapp".into(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ChannelError::UploadFailed {
                name: "whatsapp".into(),
                reason: format!("media request failed ({status}): {body}"),
            });
        }

        let media: MediaUploadResponse =
            resp.json().await.map_err(|e| ChannelError::UploadFailed {
                name: "whatsapp".into(),
                reason: format!("bad media response: {e}"),
            })?;

        tracing::info!(media_id = %media.id, filename, "WhatsApp media uploaded");
        Ok(media.id)
    }

    async fn send_image(
        &self,
        to: &str,
        media_id: &str,
        caption: Option<&str>,
    ) -> Result<(), ChannelError> {
        let mut payload = serde_json::json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "image",
            "image": {"id": media_id},
        });
        if let Some(cap) = caption {
            payload["image"]["caption"] = serde_json::Value::String(cap.to_string());
        }

        self.post_message(payload).await?;

        tracing::info!(to, media_id, "WhatsApp image sent");
        Ok(())
    }
}
