//! Builds a signed payment link without contacting the API.
//!
//! Run with:
//! ```bash
//! cargo run --example payment_link -- <merchant_id> <amount>
//! ```

use anypay_rs::{AnypayClient, AnypayConfig, PaymentLinkRequest};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let merchant = args.next().unwrap_or_else(|| "1234".to_string());
    let amount: f64 = args.next().as_deref().unwrap_or("100").parse()?;

    let client = AnypayClient::new(AnypayConfig::from_env())?;
    let link = client.create_payment_link(
        &PaymentLinkRequest::new(merchant, amount, "RUB", "order-1")
            .with_param("email", "buyer@example.com")
            .with_desc("Demo order"),
    )?;

    println!("{}", link.url);
    println!("built in {:.3} ms", link.elapsed_ms());
    Ok(())
}
