//! Domain layer: strong types for credentials, identifiers, and requests.

mod request;
mod validation;
mod value;

pub use request::SendSms;
pub use validation::ValidationError;
pub use value::{
    MessageText, PhoneNumber, RawPhoneNumber, SenderId, SharedKey, TransactionId, Username,
};
