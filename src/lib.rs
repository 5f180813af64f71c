//! Typed Rust client for the Spirius SMS Gateway REST API.
//!
//! The gateway authenticates every request with the `SpiriusSmsV1` scheme:
//! an HMAC-SHA256 signature over the timestamp, HTTP verb, request path, and
//! a SHA-1 hash of the body. This crate reproduces that scheme bit-exactly
//! and wraps the six gateway endpoints: sending mobile-terminated messages
//! and querying, listing, or popping queued mobile-originated messages.
//!
//! Responses are returned as-is ([`ApiResponse`]); the client never maps
//! HTTP status codes to errors, performs no retries, and keeps no state
//! beyond the credentials, so a client can be cloned and used concurrently.
//!
//! ```rust,no_run
//! use spirius::{MessageText, RawPhoneNumber, SendSms, SenderId, SharedKey, SpiriusClient, Username};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), spirius::SpiriusError> {
//!     let client = SpiriusClient::new(SharedKey::new("...")?, Username::new("test")?);
//!     let request = SendSms::new(
//!         RawPhoneNumber::new("+46123456789")?,
//!         SenderId::new("SPIRIUS")?,
//!         MessageText::new("Hello world!")?,
//!     );
//!     let response = client.send_sms(&request).await?;
//!     println!("{} {}", response.status, response.body);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{ApiResponse, SpiriusClient, SpiriusClientBuilder, SpiriusError};
pub use domain::{
    MessageText, PhoneNumber, RawPhoneNumber, SendSms, SenderId, SharedKey, TransactionId,
    Username, ValidationError,
};
