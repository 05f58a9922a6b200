//! # Webhook Signature Verification
//!
//! Stripe signs each webhook with `Stripe-Signature: t=<unix>,v1=<hex>`,
//! where `v1` is HMAC-SHA256 of `"{t}.{raw body}"` keyed by the endpoint's
//! signing secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use shop_core::{ShopError, ShopResult};

type HmacSha256 = Hmac<Sha256>;

/// Default replay window, in seconds
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> ShopResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => signatures.push(value.to_string()),
            _ => {}
        }
    }

    match timestamp {
        Some(timestamp) if !signatures.is_empty() => Ok(SignatureHeader {
            timestamp,
            signatures,
        }),
        _ => Err(ShopError::WebhookVerificationFailed(
            "Unable to extract timestamp and signatures from header".to_string(),
        )),
    }
}

fn compute_hmac_sha256(secret: &str, timestamp: i64, payload: &[u8]) -> ShopResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ShopError::Internal(format!("HMAC key rejected: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Verify a `Stripe-Signature` header against the raw payload.
///
/// `now` is the current unix time; the signed timestamp must be within
/// `tolerance_secs` of it.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> ShopResult<()> {
    let parsed = parse_signature_header(header)?;
    let expected = compute_hmac_sha256(secret, parsed.timestamp, payload)?;

    let valid = parsed
        .signatures
        .iter()
        .any(|sig| constant_time_compare(sig, &expected));

    if !valid {
        return Err(ShopError::WebhookVerificationFailed(
            "No signatures found matching the expected signature for payload".to_string(),
        ));
    }

    if now.abs_diff(parsed.timestamp) > tolerance_secs.max(0) as u64 {
        return Err(ShopError::WebhookVerificationFailed(
            "Timestamp outside the tolerance zone".to_string(),
        ));
    }

    Ok(())
}

/// Build a valid `Stripe-Signature` header for `payload`.
///
/// Used to replay events against a local endpoint and in tests.
pub fn signature_header(secret: &str, payload: &[u8], timestamp: i64) -> ShopResult<String> {
    let sig = compute_hmac_sha256(secret, timestamp, payload)?;
    Ok(format!("t={},v1={}", timestamp, sig))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const PAYLOAD: &[u8] = br#"{"id":"evt_1","type":"checkout.session.completed"}"#;

    #[test]
    fn test_parse_signature_header() {
        let parsed = parse_signature_header("t=1234567890,v1=abc123,v0=zzz,v1=def456").unwrap();

        assert_eq!(parsed.timestamp, 1234567890);
        assert_eq!(parsed.signatures, vec!["abc123", "def456"]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_signature_header("nonsense").is_err());
        assert!(parse_signature_header("t=123").is_err());
        assert!(parse_signature_header("v1=abc").is_err());
    }

    #[test]
    fn test_hmac_is_hex_sha256() {
        let sig = compute_hmac_sha256(SECRET, 1234567890, b"{}").unwrap();
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc123", "abc123"));
        assert!(!constant_time_compare("abc123", "abc124"));
        assert!(!constant_time_compare("abc", "abcd"));
    }

    #[test]
    fn test_generated_header_verifies() {
        let header = signature_header(SECRET, PAYLOAD, 1_700_000_000).unwrap();
        assert!(verify_signature(PAYLOAD, &header, SECRET, 300, 1_700_000_100).is_ok());
    }

    #[test]
    fn test_wrong_secret_or_tampered_body_fails() {
        let header = signature_header(SECRET, PAYLOAD, 1_700_000_000).unwrap();

        let err = verify_signature(PAYLOAD, &header, "whsec_other", 300, 1_700_000_000).unwrap_err();
        assert!(err.to_string().contains("No signatures found"));

        let tampered = br#"{"id":"evt_2","type":"checkout.session.completed"}"#;
        assert!(verify_signature(tampered, &header, SECRET, 300, 1_700_000_000).is_err());
    }

    #[test]
    fn test_stale_timestamp_fails() {
        let header = signature_header(SECRET, PAYLOAD, 1_700_000_000).unwrap();
        let err = verify_signature(PAYLOAD, &header, SECRET, 300, 1_700_000_301).unwrap_err();
        assert_eq!(err.to_string(), "Timestamp outside the tolerance zone");
    }

    #[test]
    fn test_extreme_timestamps_fail_without_overflow() {
        for timestamp in [i64::MIN, i64::MAX] {
            let header = signature_header(SECRET, PAYLOAD, timestamp).unwrap();
            for now in [i64::MIN, 0, 1_700_000_000, i64::MAX] {
                if now == timestamp {
                    continue;
                }
                let err = verify_signature(PAYLOAD, &header, SECRET, 300, now).unwrap_err();
                assert_eq!(err.to_string(), "Timestamp outside the tolerance zone");
            }
        }
    }
}
