//! Verify → decode → dispatch.
//!
//! The single entry point an HTTP host calls with the raw body and the
//! signature header. Stages short-circuit: nothing is decoded or dispatched
//! unless the signature checks out (when a secret is configured).
//!
//! The pipeline holds no per-request state and is shared across requests
//! behind an `Arc`. There is no deduplication: the platform may redeliver an
//! event, so registered handlers must be idempotent.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::dispatch::EventDispatcher;
use super::error::WebhookError;
use super::event::{EventDecoder, EventType};
use super::signature::verify_signature;

pub struct WebhookPipeline {
    decoder: EventDecoder,
    dispatcher: Arc<EventDispatcher>,
}

impl WebhookPipeline {
    pub fn new(decoder: EventDecoder, dispatcher: Arc<EventDispatcher>) -> Self {
        Self {
            decoder,
            dispatcher,
        }
    }

    pub fn decoder(&self) -> &EventDecoder {
        &self.decoder
    }

    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    /// Handle one webhook delivery.
    ///
    /// # Arguments
    ///
    /// * `payload` - The raw request body
    /// * `signature` - The signature header value (empty if absent)
    /// * `secret` - The shared secret; `None` or blank skips verification
    ///
    /// # Returns
    ///
    /// The dispatched event type on success.
    pub fn handle(
        &self,
        payload: &[u8],
        signature: &str,
        secret: Option<&str>,
    ) -> Result<EventType, WebhookError> {
        match secret.filter(|s| !s.trim().is_empty()) {
            Some(secret) => {
                if !verify_signature(payload, signature, secret) {
                    warn!(
                        payload_length = payload.len(),
                        has_signature = !signature.is_empty(),
                        "webhook_rejected_signature"
                    );
                    return Err(WebhookError::SignatureInvalid);
                }
            }
            None => {
                debug!("webhook_signature_verification_skipped");
            }
        }

        let event = self.decoder.decode(payload).map_err(|e| {
            warn!(
                error = %e,
                payload_length = payload.len(),
                "webhook_decode_failed"
            );
            WebhookError::DecodeFailed(e)
        })?;

        info!(
            event_type = %event.event_type,
            message_id = ?event.message_id,
            status = ?event.status,
            "webhook_event_decoded"
        );

        self.dispatcher.dispatch(&event)?;

        info!(event_type = %event.event_type, "webhook_event_dispatched");

        Ok(event.event_type)
    }
}
