//! Reference HTTP host for the webhook pipeline.
//!
//! Routes:
//! - `GET /health`
//! - `POST /webhooks/ccai`

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{
    ccai_webhook, health, status_for, AppState, HealthResponse, WebhookResponse,
};

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhooks/ccai", post(ccai_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
