//! Event dispatch.
//!
//! Maps an event's type to exactly one handler. Handlers are plain callbacks
//! sharing one signature; types without a registered handler (including every
//! type the platform adds in the future) go to the fallback handler, which
//! never turns an unknown type into an error.
//!
//! Registration normally happens once at startup. The registry sits behind a
//! read-write lock so late registration from another thread is still sound;
//! the lock is released before a handler runs.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use super::error::HandlerError;
use super::event::{EventType, WebhookEvent};

/// Callback invoked with a decoded event.
pub type Handler = Arc<dyn Fn(&WebhookEvent) -> anyhow::Result<()> + Send + Sync>;

/// Routes decoded events to registered handlers.
pub struct EventDispatcher {
    handlers: RwLock<HashMap<EventType, Handler>>,
    fallback: RwLock<Handler>,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    /// An empty registry whose fallback logs the event.
    pub fn new() -> Self {
        let fallback: Handler = Arc::new(log_unhandled);
        Self {
            handlers: RwLock::new(HashMap::new()),
            fallback: RwLock::new(fallback),
        }
    }

    /// A registry with a logging handler in every known slot.
    pub fn with_logging_handlers() -> Self {
        let dispatcher = Self::new();
        for event_type in EventType::ALL_KNOWN {
            let handler: fn(&WebhookEvent) -> anyhow::Result<()> = match event_type {
                EventType::SmsSent | EventType::SmsDelivered => log_sms,
                EventType::SmsFailed => log_sms_failed,
                EventType::EmailSent | EventType::EmailDelivered => log_email,
                EventType::EmailFailed => log_email_failed,
                EventType::ContactUnsubscribed => log_unsubscribed,
                EventType::Unknown(_) => continue,
            };
            dispatcher.insert(event_type, Arc::new(handler));
        }
        dispatcher
    }

    /// Register `handler` for `event_type`, replacing any previous one.
    pub fn register<F>(&self, event_type: EventType, handler: F)
    where
        F: Fn(&WebhookEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.insert(event_type, Arc::new(handler));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_handler<F>(self, event_type: EventType, handler: F) -> Self
    where
        F: Fn(&WebhookEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register(event_type, handler);
        self
    }

    /// Replace the fallback handler.
    pub fn register_fallback<F>(&self, handler: F)
    where
        F: Fn(&WebhookEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let mut fallback = self.fallback.write().unwrap_or_else(PoisonError::into_inner);
        *fallback = Arc::new(handler);
    }

    pub fn has_handler(&self, event_type: &EventType) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(event_type)
    }

    fn insert(&self, event_type: EventType, handler: Handler) {
        info!(event_type = %event_type, "webhook_handler_registered");
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(event_type, handler);
    }

    /// Invoke the handler for `event`, or the fallback if none is registered.
    pub fn dispatch(&self, event: &WebhookEvent) -> Result<(), HandlerError> {
        let registered = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&event.event_type)
            .cloned();

        let handler = match registered {
            Some(handler) => handler,
            None => {
                if !event.event_type.is_known() {
                    warn!(event_type = %event.event_type, "webhook_dispatch_unknown_type");
                }
                self.fallback
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone()
            }
        };

        handler(event).map_err(|source| {
            warn!(
                event_type = %event.event_type,
                message_id = ?event.message_id,
                error = %source,
                "webhook_handler_failed"
            );
            HandlerError {
                event_type: event.event_type.to_string(),
                source,
            }
        })
    }

    /// Dispatch each event independently; one failure does not stop the rest.
    pub fn dispatch_all(&self, events: &[WebhookEvent]) -> Vec<Result<(), HandlerError>> {
        events.iter().map(|event| self.dispatch(event)).collect()
    }
}

// =============================================================================
// Logging Handlers
// =============================================================================

fn log_sms(event: &WebhookEvent) -> anyhow::Result<()> {
    info!(
        event_type = %event.event_type,
        message_id = ?event.message_id,
        phone_number = ?event.phone_number,
        "sms_event"
    );
    Ok(())
}

fn log_sms_failed(event: &WebhookEvent) -> anyhow::Result<()> {
    warn!(
        message_id = ?event.message_id,
        phone_number = ?event.phone_number,
        error_code = ?event.error_code,
        error_message = ?event.error_message,
        "sms_failed"
    );
    Ok(())
}

fn log_email(event: &WebhookEvent) -> anyhow::Result<()> {
    info!(
        event_type = %event.event_type,
        message_id = ?event.message_id,
        email = ?event.email,
        "email_event"
    );
    Ok(())
}

fn log_email_failed(event: &WebhookEvent) -> anyhow::Result<()> {
    warn!(
        message_id = ?event.message_id,
        email = ?event.email,
        error_code = ?event.error_code,
        error_message = ?event.error_message,
        "email_failed"
    );
    Ok(())
}

fn log_unsubscribed(event: &WebhookEvent) -> anyhow::Result<()> {
    info!(
        email = ?event.email,
        phone_number = ?event.phone_number,
        "contact_unsubscribed"
    );
    Ok(())
}

fn log_unhandled(event: &WebhookEvent) -> anyhow::Result<()> {
    info!(event_type = %event.event_type, event = ?event, "webhook_event_unhandled");
    Ok(())
}
