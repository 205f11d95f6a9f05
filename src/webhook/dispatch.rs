//! Per-message orchestration and concurrent batch dispatch.
//!
//! Flow for one message:
//! 1. Extract a prompt (no prompt → instructional reply, done)
//! 2. Acknowledge with a truncated echo of the prompt
//! 3. Generate the image for the full prompt
//! 4. Upload the bytes, then send the image reply
//!
//! Failures in 2–4 are caught here: logged, converted into one
//! best-effort apology reply, and never allowed to reach a sibling
//! message or the webhook response.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{error, info, warn};

use crate::error::PipelineError;
use crate::imagegen::ImageGenerator;
use crate::messaging::Messenger;
use crate::webhook::payload::InboundMessage;

/// The acknowledgment echoes at most this many characters of the prompt.
const ACK_PROMPT_CHARS: usize = 300;

/// Reply sent when a message carries no usable prompt.
const PROMPT_HINT: &str = "Send a text prompt to generate an image.";

/// Best-effort reply when generation or delivery fails.
const APOLOGY: &str = "Sorry, I couldn't create your image right now. Please try again.";

/// Drives one inbound message from prompt to delivered image.
///
/// Collaborators are injected behind traits so the pipeline is testable
/// without a network.
pub struct RenderPipeline {
    messenger: Arc<dyn Messenger>,
    generator: Arc<dyn ImageGenerator>,
}

impl RenderPipeline {
    pub fn new(messenger: Arc<dyn Messenger>, generator: Arc<dyn ImageGenerator>) -> Self {
        Self {
            messenger,
            generator,
        }
    }

    /// Process a whole webhook batch, one independent task per message.
    ///
    /// Returns only after every message has settled. Messages run
    /// concurrently with no ordering between them; one message's failure
    /// never affects a sibling.
    pub async fn dispatch(&self, messages: Vec<InboundMessage>) {
        if messages.is_empty() {
            return;
        }
        info!(count = messages.len(), "dispatching message batch");
        join_all(messages.into_iter().map(|message| self.process(message))).await;
    }

    /// Process one inbound message to a terminal state.
    ///
    /// Infallible at this boundary: every failure is handled here.
    pub async fn process(&self, message: InboundMessage) {
        info!(
            to = %message.from,
            kind = message.kind.label(),
            "processing inbound message"
        );

        let Some(prompt) = message.kind.prompt() else {
            if let Err(e) = self.messenger.send_text(&message.from, PROMPT_HINT).await {
                warn!(to = %message.from, error = %e, "failed to send prompt hint");
            }
            return;
        };

        if let Err(e) = self.render_and_reply(&message.from, &prompt).await {
            error!(to = %message.from, error = %e, "failed to process message");
            if let Err(e) = self.messenger.send_text(&message.from, APOLOGY).await {
                warn!(to = %message.from, error = %e, "failed to send apology");
            }
        }
    }

    /// Acknowledge → generate → upload → image reply.
    async fn render_and_reply(&self, to: &str, prompt: &str) -> Result<(), PipelineError> {
        let preview: String = prompt.chars().take(ACK_PROMPT_CHARS).collect();
        self.messenger
            .send_text(to, &format!("Creating your image for: \"{preview}\""))
            .await?;

        let image = self.generator.generate(prompt).await?;

        let filename = format!("render-{}.png", Utc::now().timestamp_millis());
        let media_id = self.messenger.upload_image(image, &filename).await?;

        self.messenger
            .send_image(to, &media_id, Some(&format!("Prompt: {prompt}")))
            .await?;

        info!(to, media_id = %media_id, "image delivered");
        Ok(())
    }
}
