//! Queries the account balance and exchange rates.
//!
//! Run with:
//! ```bash
//! cargo run --example balance
//! ```
//!
//! Environment variables (a `.env` file is read if present):
//! - ANYPAY_API_ID, ANYPAY_API_KEY, ANYPAY_SECRET_KEY: account credentials
//! - ANYPAY_API_URL: API base URL (default: https://anypay.io/api)

use anypay_rs::{AnypayClient, AnypayConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "anypay_rs=debug".into()),
        )
        .init();

    let client = AnypayClient::new(AnypayConfig::from_env())?;

    let (balance, rates) = tokio::join!(client.get_balance(), client.get_rates());
    println!("Balance: {}", serde_json::to_string_pretty(&balance?)?);
    println!("Rates: {}", serde_json::to_string_pretty(&rates?)?);

    Ok(())
}
