use std::sync::Arc;

use wa_render::config::{ImageGenConfig, WhatsAppConfig};
use wa_render::imagegen::{ImageGenerator, OpenAiImageClient};
use wa_render::messaging::{Messenger, WhatsAppClient};
use wa_render::webhook::dispatch::RenderPipeline;
use wa_render::webhook::webhook_routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let port: u16 = std::env::var("WA_RENDER_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let whatsapp_config = WhatsAppConfig::from_env();
    let imagegen_config = ImageGenConfig::from_env();

    eprintln!("🎨 wa-render v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Webhook: http://0.0.0.0:{port}/webhook");
    eprintln!("   Model: {}", imagegen_config.model);
    eprintln!(
        "   Verify token: {}",
        if whatsapp_config.verify_token.is_some() {
            "set"
        } else {
            "NOT SET (verification will fail)"
        }
    );
    eprintln!(
        "   WhatsApp: {}",
        if whatsapp_config.is_configured() {
            "configured"
        } else {
            "missing credentials (outbound sends will fail)"
        }
    );
    eprintln!(
        "   OpenAI: {}\n",
        if imagegen_config.api_key.is_some() {
            "configured"
        } else {
            "missing OPENAI_API_KEY (generation will fail)"
        }
    );

    let verify_token = whatsapp_config.verify_token.clone();
    let messenger: Arc<dyn Messenger> = Arc::new(WhatsAppClient::new(whatsapp_config));
    let generator: Arc<dyn ImageGenerator> = Arc::new(OpenAiImageClient::new(imagegen_config));
    let pipeline = Arc::new(RenderPipeline::new(messenger, generator));

    let app = webhook_routes(pipeline, verify_token);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!(port, "webhook server started");
    axum::serve(listener, app).await?;

    Ok(())
}
