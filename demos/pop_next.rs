use std::io;

use spirius::{SharedKey, SpiriusClient, Username};

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

    let client = SpiriusClient::new(SharedKey::new(shared_key)?, Username::new(username)?);

    let response = client.pop_next_inbound_message().await?;
    println!("status: {}, body: {}", response.status, response.body);

    Ok(())
}
