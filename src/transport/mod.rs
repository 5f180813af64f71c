//! Transport layer: wire-format details (verbs, body encoding, signing).

mod signing;

pub use signing::{AUTH_VERSION, auth_headers, body_sha1_hex, sign, string_to_sign, unix_timestamp};

use serde::Serialize;

use crate::domain::SendSms;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// HTTP methods used by the gateway API.
pub enum HttpVerb {
    Get,
    Post,
    Delete,
}

impl HttpVerb {
    /// Uppercase method name as signed and sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

#[derive(Serialize)]
struct SendSmsBody<'a> {
    message: &'a str,
    to: &'a str,
    from: &'a str,
}

/// Serialize the send body to the exact bytes that go on the wire.
///
/// These bytes are hashed for the signature and sent as the payload; the
/// body is never re-serialized downstream, so the signed hash always covers
/// what the server receives. Field order is `message`, `to`, `from`.
pub fn encode_send_sms_body(request: &SendSms) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&SendSmsBody {
        message: request.message().as_str(),
        to: request.to().raw(),
        from: request.from().as_str(),
    })
}
