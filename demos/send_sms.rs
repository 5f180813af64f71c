use std::io;

use spirius::{MessageText, RawPhoneNumber, SendSms, SenderId, SharedKey, SpiriusClient, Username};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let shared_key = std::env::var("SPIRIUS_SHARED_KEY").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SPIRIUS_SHARED_KEY environment variable is required",
        )
    })?;
    let username = std::env::var("SPIRIUS_USERNAME").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SPIRIUS_USERNAME environment variable is required",
        )
    })?;
    let phone_raw = std::env::var("SPIRIUS_PHONE").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SPIRIUS_PHONE environment variable is required",
        )
    })?;
    let message = std::env::var("SPIRIUS_MESSAGE")
        .unwrap_or_else(|_| "Hello from the spirius demo.".to_owned());

    let client = SpiriusClient::new(SharedKey::new(shared_key)?, Username::new(username)?);
    let request = SendSms::new(
        RawPhoneNumber::new(phone_raw)?,
        SenderId::new("SPIRIUS")?,
        MessageText::new(message)?,
    );

    let response = client.send_sms(&request).await?;
    println!("status: {}, body: {}", response.status, response.body);

    Ok(())
}
