//! Outbound messaging — the reply side of the relay.

pub mod whatsapp;

pub use whatsapp::WhatsAppClient;

use async_trait::async_trait;

use crate::error::ChannelError;

/// Trait for outbound chat delivery — pure I/O, no business logic.
///
/// The pipeline only ever talks to this trait; the Graph API client is
/// one implementation, test doubles are another.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Channel name (e.g. "whatsapp").
    fn name(&self) -> &str;

    /// Send a plain text message to an address.
    async fn send_text(&self, to: &str, body: &str) -> Result<(), ChannelError>;

    /// Upload image bytes under a filename, returning an opaque media id.
    async fn upload_image(
        &self,
        image: Vec<u8>,
        filename: &str,
    ) -> Result<String, ChannelError>;

    /// Send an image message referencing a previously uploaded media id.
    async fn send_image(
        &self,
        to: &str,
        media_id: &str,
        caption: Option<&str>,
    ) -> Result<(), ChannelError>;
}
