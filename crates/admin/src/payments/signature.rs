//! Webhook signature verification.
//!
//! The signature header looks like `t=1700000000,v1=<hex>,v1=<hex>`. Each
//! `v1` is `hex(HMAC-SHA256(secret, "<t>.<raw body>"))`; more than one is
//! sent while a signing secret is being rolled.

use std::time::Duration;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::error::PaymentError;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

type HmacSha256 = Hmac<Sha256>;

fn invalid(reason: &str) -> PaymentError {
    PaymentError::InvalidSignature(reason.to_string())
}

/// Verify a webhook `payload` against its signature `header`.
///
/// `now` is the current Unix time in seconds. Timestamps further than
/// `tolerance` from it in either direction are rejected.
///
/// # Errors
///
/// Returns `PaymentError::InvalidSignature` naming what failed.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance: Duration,
    now: i64,
) -> Result<(), PaymentError> {
    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| invalid("missing timestamp"))?;
    if signatures.is_empty() {
        return Err(invalid("no v1 signature"));
    }

    let signed_at: i64 = timestamp
        .parse()
        .map_err(|_| invalid("malformed timestamp"))?;
    if now.abs_diff(signed_at) > tolerance.as_secs() {
        return Err(invalid("timestamp outside tolerance"));
    }

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| invalid(&e.to_string()))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = signatures.iter().any(|candidate| {
        hex::decode(candidate).is_ok_and(|bytes| mac.clone().verify_slice(&bytes).is_ok())
    });

    if matched {
        Ok(())
    } else {
        Err(invalid("no signatures found matching the expected signature"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test123secret456";
    const NOW: i64 = 1_700_000_000;
    const TOLERANCE: Duration = Duration::from_secs(300);
    const PAYLOAD: &[u8] = br#"{"type":"checkout.session.completed"}"#;

    fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature() {
        let header = format!("t={NOW},v1={}", sign(PAYLOAD, SECRET, NOW));
        assert!(verify_signature(PAYLOAD, &header, SECRET, TOLERANCE, NOW).is_ok());
    }

    #[test]
    fn test_any_of_several_signatures_may_match() {
        let header = format!(
            "t={NOW},v1={},v1={}",
            sign(PAYLOAD, "old_secret", NOW),
            sign(PAYLOAD, SECRET, NOW)
        );
        assert!(verify_signature(PAYLOAD, &header, SECRET, TOLERANCE, NOW).is_ok());
    }

    #[test]
    fn test_wrong_secret_and_modified_payload() {
        let header = format!("t={NOW},v1={}", sign(PAYLOAD, "wrong", NOW));
        assert!(verify_signature(PAYLOAD, &header, SECRET, TOLERANCE, NOW).is_err());

        let header = format!("t={NOW},v1={}", sign(PAYLOAD, SECRET, NOW));
        assert!(verify_signature(b"{}", &header, SECRET, TOLERANCE, NOW).is_err());
    }

    #[test]
    fn test_stale_timestamp() {
        let signed_at = NOW - 600;
        let header = format!("t={signed_at},v1={}", sign(PAYLOAD, SECRET, signed_at));
        let err = verify_signature(PAYLOAD, &header, SECRET, TOLERANCE, NOW).unwrap_err();
        assert_eq!(err.to_string(), "timestamp outside tolerance");
    }

    #[test]
    fn test_malformed_headers() {
        for header in ["", "garbage", "v1=abcd", "t=1700000000", "t=soon,v1=abcd"] {
            assert!(
                verify_signature(PAYLOAD, header, SECRET, TOLERANCE, NOW).is_err(),
                "{header:?} should be rejected"
            );
        }
        let header = format!("t={NOW},v1=not-hex");
        assert!(verify_signature(PAYLOAD, &header, SECRET, TOLERANCE, NOW).is_err());
    }
}
