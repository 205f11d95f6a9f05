//! Image generation — turns a text prompt into raw image bytes.

pub mod openai;

pub use openai::OpenAiImageClient;

use async_trait::async_trait;

use crate::error::GenerationError;

/// Trait for image generation backends.
///
/// One opaque call per prompt; no retry logic lives at this seam.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Provider name (for logging).
    fn name(&self) -> &str;

    /// Generate an image for a prompt, returning raw image bytes.
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, GenerationError>;
}
