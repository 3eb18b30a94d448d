//! HMAC-SHA256 verification for inbound vendor webhooks.
//!
//! Both the payments vendor and the identity vendor sign deliveries with a
//! header of the form `t=<unix seconds>,v1=<hex signature>[,v1=<hex>...]`.
//! The signature covers `"<t>.<raw body>"`. Several `v1` entries may be
//! present while the vendor rotates secrets; any one matching is enough.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::types::Timestamp;

type HmacSha256 = Hmac<Sha256>;

/// Accepted clock skew between the vendor and us.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Why a webhook signature was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Signature header is malformed")]
    Malformed,

    #[error("Signature header has no timestamp")]
    MissingTimestamp,

    #[error("Signature header has no v1 signature")]
    MissingSignature,

    #[error("Signature timestamp is outside the tolerance window")]
    Expired,

    #[error("No signature matches the payload")]
    Mismatch,
}

/// Parsed form of a signature header.
#[derive(Debug, PartialEq, Eq)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_header(header: &str) -> Result<SignatureHeader, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let (key, value) = part
            .trim()
            .split_once('=')
            .ok_or(SignatureError::Malformed)?;
        match key {
            "t" => {
                let ts = value.parse::<i64>().map_err(|_| SignatureError::Malformed)?;
                timestamp = Some(ts);
            }
            "v1" => signatures.push(value.to_ascii_lowercase()),
            // Other schemes (e.g. v0 test signatures) are ignored.
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
    if signatures.is_empty() {
        return Err(SignatureError::MissingSignature);
    }
    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

/// Compute the hex signature for `payload` signed at `timestamp`.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Build a complete signature header for `payload`.
///
/// Used by tests and local tooling to produce deliveries the server accepts.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    format!("t={timestamp},v1={}", compute_signature(secret, timestamp, payload))
}

/// Verify a signature header against the raw request body.
pub fn verify_signature(
    secret: &str,
    header: &str,
    payload: &[u8],
    now: Timestamp,
) -> Result<(), SignatureError> {
    let parsed = parse_header(header)?;

    let within_tolerance = now
        .timestamp()
        .checked_sub(parsed.timestamp)
        .is_some_and(|skew| skew.unsigned_abs() <= SIGNATURE_TOLERANCE_SECS.unsigned_abs());
    if !within_tolerance {
        return Err(SignatureError::Expired);
    }

    let expected = compute_signature(secret, parsed.timestamp, payload);
    if parsed
        .signatures
        .iter()
        .any(|candidate| constant_time_eq(candidate.as_bytes(), expected.as_bytes()))
    {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// Compare two byte strings without short-circuiting on the first difference.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }
}
