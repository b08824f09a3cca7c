//! CloudContactAI webhook receiver.
//!
//! Verifies, decodes and dispatches inbound delivery notifications sent by
//! the CloudContactAI platform (SMS, MMS and email events).
//!
//! - `webhook`: the transport-independent core (signature check, event
//!   decoding, handler dispatch, and the pipeline composing them)
//! - `web`: a thin axum host exposing the pipeline over HTTP
//!
//! ## Architecture
//!
//! ```text
//! POST /webhooks/ccai → WebhookPipeline → verify → decode → dispatch → handler
//! ```

pub mod config;
pub mod web;
pub mod webhook;

// Re-export commonly used types
pub use config::Config;
pub use webhook::{
    verify_signature, EventDecoder, EventDispatcher, EventType, WebhookError, WebhookEvent,
    WebhookPipeline, WireCasing,
};
