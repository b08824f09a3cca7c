//! Webhook endpoint handlers.
//!
//! The handler reads the raw body before anything parses it, so the signature
//! is checked over the exact bytes the platform sent. Pipeline errors map to
//! status codes via [`status_for`].

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::webhook::{WebhookError, WebhookPipeline};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<WebhookPipeline>,
}

impl AppState {
    pub fn new(config: Config, pipeline: WebhookPipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// CloudContactAI Webhook
// =============================================================================

/// Webhook response.
#[derive(Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
}

/// HTTP status for a pipeline failure.
pub fn status_for(error: &WebhookError) -> StatusCode {
    match error {
        WebhookError::SignatureInvalid => StatusCode::UNAUTHORIZED,
        WebhookError::DecodeFailed(_) => StatusCode::BAD_REQUEST,
        WebhookError::Handler(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// CloudContactAI webhook endpoint.
///
/// This endpoint:
/// 1. Verifies the HMAC signature (if a secret is configured)
/// 2. Decodes the event
/// 3. Dispatches it to the registered handler
pub async fn ccai_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers
        .get(state.config.signature_header.as_str())
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    info!(
        body_length = body.len(),
        has_signature = !signature.is_empty(),
        "ccai_webhook_received"
    );

    match state
        .pipeline
        .handle(&body, signature, state.config.webhook_secret.as_deref())
    {
        Ok(event_type) => (
            StatusCode::OK,
            Json(WebhookResponse {
                status: "ok",
                event_type: Some(event_type.to_string()),
            }),
        ),
        Err(e) => {
            match &e {
                WebhookError::Handler(_) => error!(error = %e, "ccai_webhook_handler_failed"),
                _ => warn!(kind = e.kind(), error = %e, "ccai_webhook_rejected"),
            }
            (
                status_for(&e),
                Json(WebhookResponse {
                    status: e.kind(),
                    event_type: None,
                }),
            )
        }
    }
}
