//! CloudContactAI webhook server.
//!
//! This binary provides a thin web server that:
//! - Receives CloudContactAI webhook deliveries
//! - Verifies the HMAC signature when a secret is configured
//! - Decodes the event and dispatches it to the logging handlers
//! - Maps failures to 401 / 400 / 500

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ccai_webhooks::web::{build_router, AppState};
use ccai_webhooks::webhook::is_signature_verification_enabled;
use ccai_webhooks::{Config, EventDecoder, EventDispatcher, WebhookPipeline};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    // Load configuration
    let config = Config::from_env();
    let verification_enabled = is_signature_verification_enabled(&config.webhook_secret);
    info!(
        port = config.port,
        signature_verification = verification_enabled,
        signature_header = %config.signature_header,
        wire_casing = ?config.wire_casing,
        "config_loaded"
    );

    if !verification_enabled {
        warn!("webhook_secret_not_configured");
    }

    // Build the pipeline; handlers are registered once here and read-only afterwards
    let dispatcher = Arc::new(EventDispatcher::with_logging_handlers());
    let pipeline = WebhookPipeline::new(EventDecoder::new(config.wire_casing), dispatcher);

    let state = AppState::new(config.clone(), pipeline);
    let app = build_router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}
