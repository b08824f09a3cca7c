//! Error taxonomy for the webhook pipeline.
//!
//! Each pipeline stage fails with a distinct kind so the HTTP host can pick
//! the right status code. An unrecognized event type is never an error.

use thiserror::Error;

/// Failure to turn a raw payload into a [`WebhookEvent`](super::WebhookEvent).
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not JSON, not an object, or a field of the wrong JSON type.
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The event type key is absent, null or blank.
    #[error("missing required field `{0}`")]
    MissingEventType(&'static str),

    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("invalid cost: {0}")]
    InvalidCost(String),
}

/// A registered handler failed on a structurally valid event.
#[derive(Debug, Error)]
#[error("handler for `{event_type}` failed: {source}")]
pub struct HandlerError {
    pub event_type: String,
    #[source]
    pub source: anyhow::Error,
}

/// Errors returned by [`WebhookPipeline::handle`](super::WebhookPipeline::handle).
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature missing or not matching while a secret is configured.
    #[error("invalid webhook signature")]
    SignatureInvalid,

    #[error("failed to decode webhook: {0}")]
    DecodeFailed(#[from] DecodeError),

    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl WebhookError {
    /// Stable label for logs and response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            WebhookError::SignatureInvalid => "signature_invalid",
            WebhookError::DecodeFailed(_) => "decode_failed",
            WebhookError::Handler(_) => "handler_error",
        }
    }
}
