//! CloudContactAI webhook signature verification.
//!
//! The platform signs every delivery with HMAC-SHA256 over the raw request
//! body, keyed by the shared webhook secret, and sends the lowercase hex
//! digest in the `X-CCAI-Signature` header. The digest may be prefixed with
//! `sha256=`; a bare digest is accepted as-is.
//!
//! Verification must run over the exact bytes received, before any JSON
//! parsing.

use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Optional algorithm prefix on the signature header value.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Default header carrying the signature.
pub const SIGNATURE_HEADER: &str = "X-CCAI-Signature";

/// Compute the lowercase hex HMAC-SHA256 digest of `payload` keyed by `secret`.
pub fn compute_signature(payload: &[u8], secret: &str) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Format a hex digest as a prefixed header value (`sha256=<hex>`).
pub fn format_signature_header(hex_digest: &str) -> String {
    format!("{}{}", SIGNATURE_PREFIX, hex_digest)
}

/// Verify a CloudContactAI webhook signature.
///
/// # Arguments
///
/// * `payload` - The raw request body, byte-for-byte as received
/// * `signature` - The signature header value, with or without `sha256=`
/// * `secret` - The shared webhook secret
///
/// # Returns
///
/// `true` only if the presented digest matches the computed one. Any empty
/// input yields `false`; this function never panics.
pub fn verify_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
    if payload.is_empty() || signature.is_empty() || secret.is_empty() {
        warn!(
            has_payload = !payload.is_empty(),
            has_signature = !signature.is_empty(),
            has_secret = !secret.is_empty(),
            "webhook_signature_missing_fields"
        );
        return false;
    }

    let presented = signature.strip_prefix(SIGNATURE_PREFIX).unwrap_or(signature);

    let expected = match compute_signature(payload, secret) {
        Ok(digest) => digest,
        Err(_) => {
            warn!("webhook_signature_invalid_key");
            return false;
        }
    };

    let valid = constant_time_compare(expected.as_bytes(), presented.as_bytes());

    if !valid {
        // Lengths only: the expected digest must never reach the logs.
        warn!(
            expected_length = expected.len(),
            actual_length = presented.len(),
            payload_length = payload.len(),
            "webhook_signature_mismatch"
        );
    }

    valid
}

/// Constant-time byte comparison.
///
/// A length mismatch returns early; digest length is public. Equal-length
/// inputs are always scanned to the end.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    std::hint::black_box(result) == 0
}

/// Check if signature verification is enabled for a configured secret.
pub fn is_signature_verification_enabled(secret: &Option<String>) -> bool {
    secret
        .as_ref()
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sign(payload: &[u8], secret: &str) -> String {
        compute_signature(payload, secret).unwrap()
    }

    #[test]
    fn test_verify_signature_missing_fields() {
        assert!(!verify_signature(b"", "sha256=abc", "secret"));
        assert!(!verify_signature(b"{}", "", "secret"));
        assert!(!verify_signature(b"{}", "sha256=abc", ""));
    }

    #[test]
    fn test_verify_signature_prefixed() {
        let payload = br#"{"eventType":"sms.sent","messageId":"123"}"#;
        let header = format_signature_header(&sign(payload, "my-secret-key"));

        assert!(header.starts_with("sha256="));
        assert!(verify_signature(payload, &header, "my-secret-key"));
    }

    #[test]
    fn test_verify_signature_bare_hex() {
        let payload = br#"{"eventType":"sms.sent","messageId":"123"}"#;
        let digest = sign(payload, "my-secret-key");

        assert_eq!(digest.len(), 64);
        assert!(verify_signature(payload, &digest, "my-secret-key"));
    }

    #[test]
    fn test_verify_signature_wrong_secret() {
        let payload = br#"{"eventType":"email.sent"}"#;
        let header = format_signature_header(&sign(payload, "correct-secret"));

        assert!(!verify_signature(payload, &header, "wrong-secret"));
    }

    #[test]
    fn test_verify_signature_modified_payload() {
        let header = format_signature_header(&sign(b"original payload", "secret"));

        assert!(verify_signature(b"original payload", &header, "secret"));
        assert!(!verify_signature(b"modified payload", &header, "secret"));
    }

    #[test]
    fn test_verify_signature_garbage_header() {
        let payload = br#"{"eventType":"sms.sent"}"#;

        assert!(!verify_signature(payload, "invalid-signature-12345", "secret"));
        assert!(!verify_signature(payload, "abc", "secret"));
        assert!(!verify_signature(payload, "sha256=", "secret"));
        assert!(!verify_signature(payload, "sha1=abcdef", "secret"));
        assert!(!verify_signature(payload, "sha256=ünïcödé", "secret"));
    }

    #[test]
    fn test_verify_signature_uppercase_hex_rejected() {
        let payload = b"payload";
        let digest = sign(payload, "secret").to_uppercase();

        assert!(!verify_signature(payload, &digest, "secret"));
    }

    #[test]
    fn test_compute_signature_known_vector() {
        // RFC 4231 test case 2
        let digest = compute_signature(b"what do ya want for nothing?", "Jefe").unwrap();
        assert_eq!(
            digest,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"abc", b"abc"));
        assert!(!constant_time_compare(b"abc", b"abd"));
        assert!(!constant_time_compare(b"abc", b"xbc"));
        assert!(!constant_time_compare(b"abc", b"abcd"));
        assert!(constant_time_compare(b"", b""));
    }

    #[test]
    fn test_is_signature_verification_enabled() {
        assert!(!is_signature_verification_enabled(&None));
        assert!(!is_signature_verification_enabled(&Some("".to_string())));
        assert!(!is_signature_verification_enabled(&Some("   ".to_string())));
        assert!(is_signature_verification_enabled(&Some("s3cret".to_string())));
    }

    proptest! {
        #[test]
        fn prop_sign_verify_roundtrip(
            payload in proptest::collection::vec(any::<u8>(), 1..512),
            secret in "[ -~]{1,64}",
        ) {
            let digest = sign(&payload, &secret);
            prop_assert!(verify_signature(&payload, &format_signature_header(&digest), &secret));
            prop_assert!(verify_signature(&payload, &digest, &secret));
        }

        #[test]
        fn prop_flipped_payload_byte_fails(
            payload in proptest::collection::vec(any::<u8>(), 1..512),
            secret in "[ -~]{1,64}",
            index in any::<proptest::sample::Index>(),
            mask in 1u8..=255,
        ) {
            let header = format_signature_header(&sign(&payload, &secret));
            let mut tampered = payload.clone();
            let i = index.index(tampered.len());
            tampered[i] ^= mask;
            prop_assert!(!verify_signature(&tampered, &header, &secret));
        }

        #[test]
        fn prop_flipped_secret_byte_fails(
            payload in proptest::collection::vec(any::<u8>(), 1..512),
            secret in "[a-z0-9]{1,64}",
            index in any::<proptest::sample::Index>(),
        ) {
            let header = format_signature_header(&sign(&payload, &secret));
            let mut bytes = secret.clone().into_bytes();
            let i = index.index(bytes.len());
            // Stay inside ASCII so the tampered secret is still a valid &str.
            bytes[i] = if bytes[i] == b'Z' { b'Y' } else { b'Z' };
            let tampered = String::from_utf8(bytes).unwrap();
            prop_assert!(!verify_signature(&payload, &header, &tampered));
        }

        #[test]
        fn prop_malformed_header_no_panic(
            header in ".*",
            payload in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            let _ = verify_signature(&payload, &header, "secret");
        }
    }
}
