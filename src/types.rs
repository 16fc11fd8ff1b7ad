//! Core data types for the Anypay API.
//!
//! These types describe what a caller hands to the client and what the client
//! hands to the wire. Responses are kept as raw JSON; their shape belongs to
//! the remote service.

use crate::errors::{AnypayError, Result};
use std::fmt;
use std::time::Duration;

/// Smallest payout amount the service accepts, in currency units.
pub const MIN_PAYOUT_AMOUNT: f64 = 50.0;

/// Description used on payment links when the caller does not supply one.
pub const DEFAULT_LINK_DESCRIPTION: &str = "use module anypay.io";

/// Parsed JSON body returned by the service, passed through verbatim.
pub type ApiResponse = serde_json::Value;

/// Ordered query parameters. Order is preserved on the wire.
pub type Params = Vec<(String, String)>;

/// API credentials bound to a client for its whole lifetime.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_id: String,
    api_key: String,
    secret_key: String,
}

impl Credentials {
    /// Creates a credential set, rejecting any empty field.
    ///
    /// # Examples
    ///
    /// ```
    /// use anypay_rs::types::Credentials;
    ///
    /// let credentials = Credentials::new("A1", "K1", "S").unwrap();
    /// assert_eq!(credentials.api_id(), "A1");
    ///
    /// assert!(Credentials::new("A1", "", "S").is_err());
    /// ```
    pub fn new(
        api_id: impl Into<String>,
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self> {
        let credentials = Self {
            api_id: api_id.into(),
            api_key: api_key.into(),
            secret_key: secret_key.into(),
        };

        if credentials.api_id.trim().is_empty() {
            return Err(AnypayError::ConfigError("Invalid apiId".to_string()));
        }
        if credentials.api_key.trim().is_empty() {
            return Err(AnypayError::ConfigError("Invalid apiKey".to_string()));
        }
        if credentials.secret_key.trim().is_empty() {
            return Err(AnypayError::ConfigError("Invalid secretKey".to_string()));
        }

        Ok(credentials)
    }

    /// Public API identifier, also used as a URL path segment.
    pub fn api_id(&self) -> &str {
        &self.api_id
    }

    /// API key used in SHA-256 request signatures.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Merchant secret used in MD5 payment-link signatures.
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_id", &self.api_id)
            .field("api_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// The URL shape a request takes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// `<base>/<method>/<apiId>?<params>`, signature carried as a query key
    Query,
    /// `<base>/<method>`, no credentials at all
    Bare,
    /// `<base>/<method>/<apiId>?sign=<sign>`
    Signed,
}

/// One remote call before it is turned into a target URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    /// Operation name, used as the first path segment
    pub method: String,

    /// Structured parameters, including their own `sign` entry
    pub params: Option<Params>,

    /// Precomputed signature for calls without extra parameters
    pub sign: Option<String>,
}

impl OperationRequest {
    /// A call whose only query key is the signature.
    pub fn signed(method: impl Into<String>, sign: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: None,
            sign: Some(sign.into()),
        }
    }

    /// A call with a parameter set that already embeds its signature.
    pub fn with_params(method: impl Into<String>, params: Params) -> Self {
        Self {
            method: method.into(),
            params: Some(params),
            sign: None,
        }
    }

    /// A call with neither parameters nor signature.
    pub fn bare(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: None,
            sign: None,
        }
    }

    /// Selects the URL shape. Parameters win over a signature; a request
    /// with neither falls back to the bare endpoint.
    pub fn mode(&self) -> DispatchMode {
        if self.params.is_some() {
            DispatchMode::Query
        } else if self.sign.is_none() {
            DispatchMode::Bare
        } else {
            DispatchMode::Signed
        }
    }
}

/// Input for a merchant payment link. Never sent over the network by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentLinkRequest {
    /// Merchant (project) id
    pub merchant: String,

    /// Amount to charge
    pub amount: f64,

    /// ISO currency code, e.g. "RUB"
    pub currency: String,

    /// Merchant-side payment id
    pub pay_id: String,

    /// Extra query parameters appended after the fixed ones
    pub params: Params,

    /// Payment description shown to the payer
    pub desc: Option<String>,
}

impl PaymentLinkRequest {
    /// Creates a payment link request without extra parameters.
    pub fn new(
        merchant: impl Into<String>,
        amount: f64,
        currency: impl Into<String>,
        pay_id: impl Into<String>,
    ) -> Self {
        Self {
            merchant: merchant.into(),
            amount,
            currency: currency.into(),
            pay_id: pay_id.into(),
            params: Vec::new(),
            desc: None,
        }
    }

    /// Appends an extra query parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Sets the payment description.
    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }
}

/// A locally built payment link.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentLink {
    /// Full URL for the payer to follow
    pub url: String,

    /// Local time spent building the link
    pub elapsed: Duration,
}

impl PaymentLink {
    /// Build time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// A payout order.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoutRequest {
    /// Unique payout number in the merchant's system
    pub payout_id: String,

    /// Payout method, e.g. "card" or "qiwi"
    pub payout_type: String,

    /// Amount to withdraw, at least [`MIN_PAYOUT_AMOUNT`]
    pub amount: f64,

    /// Wallet or card number
    pub wallet: String,

    /// Additional fields forwarded as-is, e.g. `status_url`
    pub extra: Params,
}

impl PayoutRequest {
    /// Creates a payout request.
    ///
    /// # Examples
    ///
    /// ```
    /// use anypay_rs::types::PayoutRequest;
    ///
    /// let payout = PayoutRequest::new("po-1", "card", 50.0, "4100000000000000")
    ///     .with_field("commission_type", "balance");
    /// assert_eq!(payout.extra.len(), 1);
    /// ```
    pub fn new(
        payout_id: impl Into<String>,
        payout_type: impl Into<String>,
        amount: f64,
        wallet: impl Into<String>,
    ) -> Self {
        Self {
            payout_id: payout_id.into(),
            payout_type: payout_type.into(),
            amount,
            wallet: wallet.into(),
            extra: Vec::new(),
        }
    }

    /// Appends an additional field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }
}

/// Renders an amount the way the service expects it in signatures and queries.
///
/// Whole numbers carry no fractional part.
///
/// ```
/// use anypay_rs::types::format_amount;
///
/// assert_eq!(format_amount(100.0), "100");
/// assert_eq!(format_amount(50.5), "50.5");
/// ```
pub fn format_amount(amount: f64) -> String {
    amount.to_string()
}
