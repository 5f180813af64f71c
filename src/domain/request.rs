use crate::domain::value::{MessageText, RawPhoneNumber, SenderId};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A mobile-terminated send request (`POST /sms/mt/send`).
///
/// The wire body carries exactly the fields `message`, `to`, and `from`;
/// encoding is handled by the transport layer so the serialized bytes used
/// for signing and for the request payload are always the same.
pub struct SendSms {
    to: RawPhoneNumber,
    from: SenderId,
    message: MessageText,
}

impl SendSms {
    /// Build a send request from already-validated parts.
    pub fn new(to: RawPhoneNumber, from: SenderId, message: MessageText) -> Self {
        Self { to, from, message }
    }

    /// Recipient number (`to`).
    pub fn to(&self) -> &RawPhoneNumber {
        &self.to
    }

    /// Sender id (`from`).
    pub fn from(&self) -> &SenderId {
        &self.from
    }

    /// Message text (`message`).
    pub fn message(&self) -> &MessageText {
        &self.message
    }
}
