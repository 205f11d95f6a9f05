//! Configuration types — read once from the environment at startup.
//!
//! Credentials are optional at construction time: a missing variable
//! surfaces as a `ConfigError` on the first collaborator call that needs
//! it, and takes that call's failure path.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default model for the OpenAI Images API.
pub const DEFAULT_IMAGE_MODEL: &str = "gpt-image-1";

/// Default rendered image size.
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

/// Default rendering quality.
pub const DEFAULT_IMAGE_QUALITY: &str = "high";

/// WhatsApp Business configuration (webhook secret + Graph API sender).
#[derive(Clone)]
pub struct WhatsAppConfig {
    /// Secret for the webhook verification handshake.
    pub verify_token: Option<String>,
    /// Graph API bearer token.
    pub access_token: Option<SecretString>,
    /// Phone number id the bot sends from.
    pub phone_number_id: Option<String>,
}

impl WhatsAppConfig {
    pub fn from_env() -> Self {
        Self {
            verify_token: std::env::var("WHATSAPP_VERIFY_TOKEN").ok(),
            access_token: std::env::var("WHATSAPP_TOKEN").ok().map(SecretString::from),
            phone_number_id: std::env::var("WHATSAPP_PHONE_NUMBER_ID").ok(),
        }
    }

    /// Credentials for outbound Graph API calls.
    pub fn credentials(&self) -> Result<(&SecretString, &str), ConfigError> {
        let token = self
            .access_token
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("WHATSAPP_TOKEN".into()))?;
        let phone_number_id = self
            .phone_number_id
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("WHATSAPP_PHONE_NUMBER_ID".into()))?;
        Ok((token, phone_number_id))
    }

    /// True when outbound sends can be attempted.
    pub fn is_configured(&self) -> bool {
        self.access_token.is_some() && self.phone_number_id.is_some()
    }
}

/// Image generation configuration.
#[derive(Clone)]
pub struct ImageGenConfig {
    pub api_key: Option<SecretString>,
    pub model: String,
    pub size: String,
    pub quality: String,
}

impl ImageGenConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok().map(SecretString::from),
            model: std::env::var("WA_RENDER_IMAGE_MODEL")
                .unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string()),
            size: DEFAULT_IMAGE_SIZE.to_string(),
            quality: DEFAULT_IMAGE_QUALITY.to_string(),
        }
    }

    /// The generation credential, required per call.
    pub fn api_key(&self) -> Result<&SecretString, ConfigError> {
        self.api_key
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".into()))
    }
}
