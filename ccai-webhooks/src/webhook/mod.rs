//! Inbound webhook core.
//!
//! Verifies, decodes and dispatches CloudContactAI delivery notifications
//! (SMS, MMS and email events).
//!
//! ## Flow
//!
//! ```text
//! raw body + signature → verify_signature → EventDecoder → EventDispatcher → handler
//! ```
//!
//! All state is local to one call; the pipeline can be shared freely between
//! request tasks.

pub mod dispatch;
pub mod error;
pub mod event;
pub mod pipeline;
pub mod signature;

pub use dispatch::{EventDispatcher, Handler};
pub use error::{DecodeError, HandlerError, WebhookError};
pub use event::{EventDecoder, EventType, WebhookEvent, WireCasing};
pub use pipeline::WebhookPipeline;
pub use signature::{
    compute_signature, format_signature_header, is_signature_verification_enabled,
    verify_signature, SIGNATURE_HEADER, SIGNATURE_PREFIX,
};
