//! Listens for payment notifications until Ctrl-C.
//!
//! Run with:
//! ```bash
//! PORT=8080 cargo run --example callback
//! ```

use anypay_rs::{AnypayClient, AnypayConfig, SessionParams};
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
    let handle = client
        .create_session(
            None,
            SessionParams::new("/anypay", |notification| {
                tracing::info!(?notification, "payment notification");
            }),
        )
        .await?;

    println!("Listening on http://{}/anypay", handle.local_addr());
    tokio::signal::ctrl_c().await?;
    handle.shutdown().await?;
    Ok(())
}
