//! GitHub webhook signature verification using HMAC-SHA1.
//!
//! GitHub signs webhook payloads with the project's shared secret and sends
//! the result in the `X-Hub-Signature` header as `sha1=<hex>`.
//!
//! Verification runs before the payload is trusted for anything beyond
//! locating the project; a request whose signature does not match is rejected.

use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Prefix of the signature header value.
const SIGNATURE_PREFIX: &str = "sha1=";

/// Parses a GitHub signature header (e.g., "sha1=abc123...") into raw bytes.
///
/// Returns `None` for malformed headers (missing prefix, invalid hex, etc.).
/// Never panics.
///
/// # Examples
///
/// ```
/// use build_gateway::webhooks::parse_signature_header;
///
/// assert!(parse_signature_header("sha1=abcd1234").is_some());
/// assert!(parse_signature_header("abcd1234").is_none());
/// assert!(parse_signature_header("sha256=abcd1234").is_none());
/// assert!(parse_signature_header("sha1=xyz").is_none());
/// ```
pub fn parse_signature_header(header: &str) -> Option<Vec<u8>> {
    let hex_sig = header.strip_prefix(SIGNATURE_PREFIX)?;
    hex::decode(hex_sig).ok()
}

/// Computes the HMAC-SHA1 of a payload using the given secret.
///
/// Returns `None` only if the key is rejected, which HMAC never does.
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Option<Vec<u8>> {
    let mut mac = HmacSha1::new_from_slice(secret).ok()?;
    mac.update(payload);
    Some(mac.finalize().into_bytes().to_vec())
}

/// Formats a signature as a GitHub-style header value (`sha1=<hex>`).
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(signature))
}

/// Signs a payload and formats the result as a header value.
///
/// This is what a provider puts in `X-Hub-Signature`; useful for tests and
/// for tooling that replays deliveries.
pub fn sign_payload(payload: &[u8], secret: &[u8]) -> String {
    let signature = compute_signature(payload, secret).unwrap_or_default();
    format_signature_header(&signature)
}

/// Verifies a GitHub webhook signature against the payload and secret.
///
/// Returns `true` if the signature is valid, `false` otherwise. A missing or
/// malformed header is invalid. Uses constant-time comparison.
///
/// # Examples
///
/// ```
/// use build_gateway::webhooks::{sign_payload, verify_signature};
///
/// let payload = b"Hello, World!";
/// let header = sign_payload(payload, b"my-secret-key");
///
/// assert!(verify_signature(payload, Some(&header), b"my-secret-key"));
/// assert!(!verify_signature(payload, Some(&header), b"wrong-secret"));
/// assert!(!verify_signature(payload, None, b"my-secret-key"));
/// ```
pub fn verify_signature(payload: &[u8], signature_header: Option<&str>, secret: &[u8]) -> bool {
    let Some(header) = signature_header else {
        return false;
    };
    let expected_signature = match parse_signature_header(header.trim()) {
        Some(sig) => sig,
        None => return false,
    };

    let mut mac = match HmacSha1::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);

    // Constant-time comparison via the HMAC library
    mac.verify_slice(&expected_signature).is_ok()
}
