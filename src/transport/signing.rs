//! The `SpiriusSmsV1` request-signing scheme.
//!
//! Every request carries an HMAC signature over a five-line string:
//!
//! ```text
//! SpiriusSmsV1 + "\n" +
//! UnixTimestamp + "\n" +
//! HTTP-Verb + "\n" +
//! Path + "\n" +
//! SHA1-Hex(Body)
//! ```
//!
//! Where the `Authorization` header value is
//! `SpiriusSmsV1 <username>:<Base64(HMAC-SHA256(SharedKey, StringToSign))>`.
//! The path is the path-only part of the URL (no base, no query string), and
//! the body hash covers the exact bytes sent on the wire; for a bodyless
//! request it is the SHA-1 of the empty string.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Auth scheme tag; first line of the string to sign and the
/// `Authorization` header prefix.
pub const AUTH_VERSION: &str = "SpiriusSmsV1";

/// Current Unix time in seconds, rendered as a decimal string.
pub fn unix_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
        .to_string()
}

/// Lowercase SHA-1 hex digest of the request body bytes.
///
/// `None` hashes the same as an empty byte string, per the gateway contract.
pub fn body_sha1_hex(body: Option<&[u8]>) -> String {
    hex::encode(Sha1::digest(body.unwrap_or_default()))
}

/// Build the five-line string to sign.
pub fn string_to_sign(timestamp: &str, verb: &str, path: &str, body: Option<&[u8]>) -> String {
    let body_hash = body_sha1_hex(body);
    [AUTH_VERSION, timestamp, verb, path, body_hash.as_str()].join("\n")
}

/// Sign a request: base64 of HMAC-SHA256 over the string to sign.
pub fn sign(shared_key: &str, timestamp: &str, verb: &str, path: &str, body: Option<&[u8]>) -> String {
    let string_to_sign = string_to_sign(timestamp, verb, path, body);
    debug!(%verb, %path, "signing request");

    let mut mac = HmacSha256::new_from_slice(shared_key.as_bytes())
        .expect("HMAC can accept any key length");
    mac.update(string_to_sign.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Headers sent on every request, bodyless ones included.
pub fn auth_headers(username: &str, timestamp: &str, signature: &str) -> Vec<(String, String)> {
    vec![
        ("X-SMS-Timestamp".to_owned(), timestamp.to_owned()),
        (
            "Authorization".to_owned(),
            format!("{AUTH_VERSION} {username}:{signature}"),
        ),
        ("Content-Type".to_owned(), "application/json".to_owned()),
    ]
}
