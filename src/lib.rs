//! # anypay-rs
//!
//! A Rust client for the [Anypay](https://anypay.io) payment API.
//!
//! Every call is authenticated with a per-method signature: a SHA-256 digest over the
//! operation name, its parameters and the account credentials, concatenated in an order
//! fixed for each operation. Payment links use a separate MD5 scheme keyed by the
//! merchant secret and are built locally without any network traffic.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use anypay_rs::client::{AnypayClient, AnypayConfig};
//! use anypay_rs::types::{PaymentLinkRequest, PayoutRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AnypayClient::new(AnypayConfig::new("API_ID", "API_KEY", "SECRET_KEY"))?;
//!
//! let balance = client.get_balance().await?;
//! println!("Balance: {}", balance);
//!
//! let link = client.create_payment_link(
//!     &PaymentLinkRequest::new("1234", 100.0, "RUB", "order-1").with_param("email", "a@b.c"),
//! )?;
//! println!("Pay here: {}", link.url);
//!
//! let payout = PayoutRequest::new("po-1", "card", 500.0, "4100000000000000");
//! client.create_payout(&payout).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Request Pipeline
//!
//! 1. **Validate**: arguments are checked before anything is signed or sent
//! 2. **Sign**: the operation's signature recipe is applied to the credentials
//! 3. **Build**: the target URL takes one of three shapes (see [`request`])
//! 4. **Dispatch**: one POST with an empty body; the JSON reply is returned verbatim
//!
//! ## Notifications
//!
//! [`client::AnypayClient::create_session`] starts a [`server::CallbackServer`] that
//! receives asynchronous payment notifications and forwards them to a handler.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod dispatcher;
pub mod errors;
pub mod request;
pub mod server;
pub mod signer;
pub mod types;

// Re-export commonly used items
pub use client::{AnypayClient, AnypayConfig};
pub use errors::{AnypayError, Result, ValidationError};
pub use server::{Notification, ServerHandle, SessionParams};
pub use types::{
    ApiResponse, Credentials, DispatchMode, OperationRequest, PaymentLink, PaymentLinkRequest,
    PayoutRequest, MIN_PAYOUT_AMOUNT,
};
