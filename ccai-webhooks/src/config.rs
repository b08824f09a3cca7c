//! Configuration module for environment variable parsing.
//!
//! Only the web host reads the environment; the webhook core takes its
//! secret and casing as plain parameters.

use std::env;
use tracing::warn;

use crate::webhook::{WireCasing, SIGNATURE_HEADER};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Shared secret for HMAC signature verification. Unset disables verification.
    pub webhook_secret: Option<String>,

    /// Key casing of inbound payloads
    pub wire_casing: WireCasing,

    /// Header carrying the payload signature
    pub signature_header: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            webhook_secret: None,
            wire_casing: WireCasing::default(),
            signature_header: SIGNATURE_HEADER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),

            webhook_secret: env::var("CCAI_WEBHOOK_SECRET").ok(),

            wire_casing: parse_casing("CCAI_WEBHOOK_CASING", defaults.wire_casing),

            signature_header: env::var("CCAI_SIGNATURE_HEADER")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.signature_header),
        }
    }
}

/// Parse a wire casing name, falling back to `default` on absent or bad input.
fn parse_casing(name: &str, default: WireCasing) -> WireCasing {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.parse() {
        Ok(casing) => casing,
        Err(e) => {
            warn!(env_var = name, value = %raw, error = %e, "Invalid wire casing, using default");
            default
        }
    }
}
