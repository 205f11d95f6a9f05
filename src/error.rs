//! Error types for wa-render.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// Outbound messaging errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to send message via {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Failed to upload media via {name}: {reason}")]
    UploadFailed { name: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Image generation errors.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Image generation returned no data")]
    Empty,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Per-message pipeline errors.
///
/// Recovered at the pipeline boundary — they reach the operator log and
/// an apology reply, never the webhook response.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
}
