//! Webhook gateway — the inbound HTTP surface.
//!
//! Handles the Meta verification handshake (GET) and event intake
//! (POST). Intake decodes the nested payload, flattens it into inbound
//! messages, and fans them out through the [`RenderPipeline`]. Once the
//! payload parses, the platform always gets a single success
//! acknowledgment — per-message outcomes stay internal.

pub mod dispatch;
pub mod payload;

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use tracing::{info, warn};

use dispatch::RenderPipeline;
use payload::WebhookPayload;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RenderPipeline>,
    /// Secret for the verification handshake (`None` → always forbidden).
    pub verify_token: Option<String>,
}

/// Build the Axum router for the webhook surface.
pub fn webhook_routes(pipeline: Arc<RenderPipeline>, verify_token: Option<String>) -> Router {
    let state = AppState {
        pipeline,
        verify_token,
    };

    Router::new()
        .route("/webhook", get(verify).post(receive_event))
        .route("/health", get(health))
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "wa-render"
    }))
}

// ── Verification handshake ──────────────────────────────────────────────

/// Query parameters of the Meta verification handshake.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
}

/// Echo the challenge iff mode, token, and challenge all check out.
///
/// Side-effect-free; the platform may probe repeatedly.
async fn verify(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> impl IntoResponse {
    match subscription_challenge(&params, state.verify_token.as_deref()) {
        Some(challenge) => {
            info!("webhook verification succeeded");
            (StatusCode::OK, challenge)
        }
        None => {
            warn!(mode = ?params.mode, "webhook verification failed");
            (StatusCode::FORBIDDEN, "forbidden".to_string())
        }
    }
}

/// The challenge to echo back, if the handshake is valid.
fn subscription_challenge(params: &VerifyParams, expected_token: Option<&str>) -> Option<String> {
    let mode = params.mode.as_deref()?;
    let token = params.verify_token.as_deref()?;
    let challenge = params.challenge.as_deref()?;
    let expected = expected_token?;

    (mode == "subscribe" && token == expected).then(|| challenge.to_string())
}

// ── Event intake ────────────────────────────────────────────────────────

/// Decode and dispatch one webhook delivery.
///
/// Malformed JSON is the caller's problem (400, not retriable here).
/// A parsed payload is acknowledged with 200 after the whole batch has
/// settled, whatever happened to the individual messages.
async fn receive_event(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "invalid webhook payload");
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "invalid-json"})),
            );
        }
    };

    let messages = payload.into_messages();
    state.pipeline.dispatch(messages).await;

    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}
