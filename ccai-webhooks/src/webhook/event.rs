//! Webhook event model and decoder.
//!
//! A delivery is a flat JSON object. Only the event type is required; every
//! other field is optional because the platform does not fix a schema per
//! event type. Unknown fields are ignored.
//!
//! Two key casings exist in the wild (`eventType` and `event_type`). A decoder
//! is bound to exactly one [`WireCasing`]; payloads in the other casing fail
//! to decode rather than being silently accepted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::error::DecodeError;

// =============================================================================
// Event Type
// =============================================================================

/// Dispatch key of a webhook event.
///
/// The seven documented types get their own variant. Anything else is kept
/// verbatim in [`EventType::Unknown`] so new platform events still flow
/// through.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    SmsSent,
    SmsDelivered,
    SmsFailed,
    EmailSent,
    EmailDelivered,
    EmailFailed,
    ContactUnsubscribed,
    Unknown(String),
}

impl EventType {
    /// Every documented event type.
    pub const ALL_KNOWN: [EventType; 7] = [
        EventType::SmsSent,
        EventType::SmsDelivered,
        EventType::SmsFailed,
        EventType::EmailSent,
        EventType::EmailDelivered,
        EventType::EmailFailed,
        EventType::ContactUnsubscribed,
    ];

    pub fn parse(raw: &str) -> Self {
        match raw {
            "sms.sent" => EventType::SmsSent,
            "sms.delivered" => EventType::SmsDelivered,
            "sms.failed" => EventType::SmsFailed,
            "email.sent" => EventType::EmailSent,
            "email.delivered" => EventType::EmailDelivered,
            "email.failed" => EventType::EmailFailed,
            "contact.unsubscribed" => EventType::ContactUnsubscribed,
            other => EventType::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventType::SmsSent => "sms.sent",
            EventType::SmsDelivered => "sms.delivered",
            EventType::SmsFailed => "sms.failed",
            EventType::EmailSent => "email.sent",
            EventType::EmailDelivered => "email.delivered",
            EventType::EmailFailed => "email.failed",
            EventType::ContactUnsubscribed => "contact.unsubscribed",
            EventType::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, EventType::Unknown(_))
    }

    /// Delivery channel the event belongs to: `sms`, `email` or `contact`.
    pub fn channel(&self) -> Option<&'static str> {
        match self {
            EventType::SmsSent | EventType::SmsDelivered | EventType::SmsFailed => Some("sms"),
            EventType::EmailSent | EventType::EmailDelivered | EventType::EmailFailed => {
                Some("email")
            }
            EventType::ContactUnsubscribed => Some("contact"),
            EventType::Unknown(_) => None,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EventType {
    fn from(raw: &str) -> Self {
        EventType::parse(raw)
    }
}

// =============================================================================
// Webhook Event
// =============================================================================

/// A decoded webhook notification.
///
/// Built once by [`EventDecoder::decode`]; handlers only ever see `&WebhookEvent`.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    pub event_type: EventType,
    pub timestamp: Option<DateTime<Utc>>,
    pub campaign_id: Option<String>,
    pub message_id: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub delivery_status: Option<String>,
    pub account_id: Option<String>,
    pub cost: Option<Decimal>,
    pub custom_data: Option<Map<String, Value>>,
}

impl WebhookEvent {
    /// An event carrying only its type.
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            timestamp: None,
            campaign_id: None,
            message_id: None,
            phone_number: None,
            email: None,
            status: None,
            error_code: None,
            error_message: None,
            delivery_status: None,
            account_id: None,
            cost: None,
            custom_data: None,
        }
    }
}

// =============================================================================
// Wire Format
// =============================================================================

/// Key casing of the JSON payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WireCasing {
    /// `eventType`, `messageId`, ... (current API)
    #[default]
    Camel,
    /// `event_type`, `message_id`, ... (legacy Java SDK)
    Snake,
}

impl WireCasing {
    fn event_type_key(self) -> &'static str {
        match self {
            WireCasing::Camel => "eventType",
            WireCasing::Snake => "event_type",
        }
    }
}

impl FromStr for WireCasing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "camel" | "camelcase" => Ok(WireCasing::Camel),
            "snake" | "snake_case" => Ok(WireCasing::Snake),
            other => Err(format!("unknown wire casing: {}", other)),
        }
    }
}

/// Declares one wire struct per casing over the same field list.
///
/// Timestamp and cost stay loosely typed here and are coerced in
/// [`WireEvent::into_event`] so failures carry a precise [`DecodeError`].
macro_rules! wire_event {
    ($name:ident, $casing:tt) => {
        #[derive(Debug, Default, Serialize, Deserialize)]
        #[serde(rename_all = $casing)]
        struct $name {
            #[serde(default, skip_serializing_if = "Option::is_none")]
            event_type: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            timestamp: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            campaign_id: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            message_id: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            phone_number: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            email: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            status: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            error_code: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            error_message: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            delivery_status: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            account_id: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            cost: Option<Value>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            custom_data: Option<Map<String, Value>>,
        }

        impl From<WireEvent> for $name {
            fn from(w: WireEvent) -> Self {
                Self {
                    event_type: w.event_type,
                    timestamp: w.timestamp,
                    campaign_id: w.campaign_id,
                    message_id: w.message_id,
                    phone_number: w.phone_number,
                    email: w.email,
                    status: w.status,
                    error_code: w.error_code,
                    error_message: w.error_message,
                    delivery_status: w.delivery_status,
                    account_id: w.account_id,
                    cost: w.cost,
                    custom_data: w.custom_data,
                }
            }
        }

        impl From<$name> for WireEvent {
            fn from(w: $name) -> Self {
                Self {
                    event_type: w.event_type,
                    timestamp: w.timestamp,
                    campaign_id: w.campaign_id,
                    message_id: w.message_id,
                    phone_number: w.phone_number,
                    email: w.email,
                    status: w.status,
                    error_code: w.error_code,
                    error_message: w.error_message,
                    delivery_status: w.delivery_status,
                    account_id: w.account_id,
                    cost: w.cost,
                    custom_data: w.custom_data,
                }
            }
        }
    };
}

/// Casing-neutral intermediate between the wire structs and [`WebhookEvent`].
#[derive(Debug, Default)]
struct WireEvent {
    event_type: Option<String>,
    timestamp: Option<String>,
    campaign_id: Option<String>,
    message_id: Option<String>,
    phone_number: Option<String>,
    email: Option<String>,
    status: Option<String>,
    error_code: Option<String>,
    error_message: Option<String>,
    delivery_status: Option<String>,
    account_id: Option<String>,
    cost: Option<Value>,
    custom_data: Option<Map<String, Value>>,
}

wire_event!(CamelWire, "camelCase");
wire_event!(SnakeWire, "snake_case");

impl WireEvent {
    fn into_event(self, casing: WireCasing) -> Result<WebhookEvent, DecodeError> {
        let event_type = self
            .event_type
            .filter(|t| !t.trim().is_empty())
            .ok_or(DecodeError::MissingEventType(casing.event_type_key()))?;

        let timestamp = self.timestamp.as_deref().map(parse_timestamp).transpose()?;
        let cost = self.cost.as_ref().map(parse_cost).transpose()?;

        Ok(WebhookEvent {
            event_type: EventType::parse(&event_type),
            timestamp,
            campaign_id: self.campaign_id,
            message_id: self.message_id,
            phone_number: self.phone_number,
            email: self.email,
            status: self.status,
            error_code: self.error_code,
            error_message: self.error_message,
            delivery_status: self.delivery_status,
            account_id: self.account_id,
            cost,
            custom_data: self.custom_data,
        })
    }

    fn from_event(event: &WebhookEvent) -> Self {
        Self {
            event_type: Some(event.event_type.as_str().to_string()),
            timestamp: event
                .timestamp
                .map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            campaign_id: event.campaign_id.clone(),
            message_id: event.message_id.clone(),
            phone_number: event.phone_number.clone(),
            email: event.email.clone(),
            status: event.status.clone(),
            error_code: event.error_code.clone(),
            error_message: event.error_message.clone(),
            delivery_status: event.delivery_status.clone(),
            account_id: event.account_id.clone(),
            cost: event.cost.and_then(decimal_to_json),
            custom_data: event.custom_data.clone(),
        }
    }
}

/// Parse an RFC 3339 timestamp, or the zone-less ISO form (read as UTC).
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DecodeError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| DecodeError::InvalidTimestamp(raw.to_string()))
}

/// Coerce a JSON number or numeric string into a decimal.
///
/// Numbers keep their source text (`arbitrary_precision`), so no digit is
/// lost to an `f64` on the way in.
fn parse_cost(raw: &Value) -> Result<Decimal, DecodeError> {
    let text = match raw {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => return Err(DecodeError::InvalidCost(other.to_string())),
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| DecodeError::InvalidCost(raw.to_string()))
}

fn decimal_to_json(cost: Decimal) -> Option<Value> {
    Number::from_str(&cost.to_string()).ok().map(Value::Number)
}

// =============================================================================
// Decoder
// =============================================================================

/// Strict JSON decoder for webhook payloads, bound to one wire casing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventDecoder {
    casing: WireCasing,
}

impl EventDecoder {
    pub fn new(casing: WireCasing) -> Self {
        Self { casing }
    }

    pub fn casing(&self) -> WireCasing {
        self.casing
    }

    /// Decode a raw payload into a [`WebhookEvent`].
    ///
    /// Fails when the body is not a JSON object, the event type is missing or
    /// blank, or a typed field (`timestamp`, `cost`, `customData`, string
    /// fields) holds a value of the wrong shape.
    pub fn decode(&self, payload: &[u8]) -> Result<WebhookEvent, DecodeError> {
        // Objects only: a derived struct would also accept a JSON array.
        let object = Value::Object(serde_json::from_slice::<Map<String, Value>>(payload)?);
        let wire: WireEvent = match self.casing {
            WireCasing::Camel => serde_json::from_value::<CamelWire>(object)?.into(),
            WireCasing::Snake => serde_json::from_value::<SnakeWire>(object)?.into(),
        };
        wire.into_event(self.casing)
    }

    /// Encode an event in this decoder's casing. Absent fields are omitted.
    pub fn encode(&self, event: &WebhookEvent) -> Result<Vec<u8>, serde_json::Error> {
        let wire = WireEvent::from_event(event);
        match self.casing {
            WireCasing::Camel => serde_json::to_vec(&CamelWire::from(wire)),
            WireCasing::Snake => serde_json::to_vec(&SnakeWire::from(wire)),
        }
    }
}
