//! Client for the Anypay API.
//!
//! [`AnypayClient`] exposes one method per remote operation. Each method
//! validates its arguments, signs the call, builds the target URL and sends a
//! single request. Invalid input is rejected before anything is signed or sent.

use crate::dispatcher;
use crate::errors::{AnypayError, Result, ValidationError};
use crate::request::{build_payment_link, build_target};
use crate::server::{
    AxumCallbackServer, CallbackConfig, CallbackServer, ServerHandle, SessionParams,
    DEFAULT_CALLBACK_PORT,
};
use crate::signer::Signer;
use crate::types::{
    format_amount, ApiResponse, Credentials, OperationRequest, Params, PaymentLink,
    PaymentLinkRequest, PayoutRequest, MIN_PAYOUT_AMOUNT,
};
use reqwest::Client;
use std::env;
use std::sync::Arc;
use url::Url;

/// Default base URL of the API.
pub const DEFAULT_API_URL: &str = "https://anypay.io/api";

/// Default base URL of merchant payment pages.
pub const DEFAULT_MERCHANT_URL: &str = "https://anypay.io/merchant";

/// Configuration for an [`AnypayClient`].
#[derive(Clone)]
pub struct AnypayConfig {
    /// API identifier
    pub api_id: String,

    /// API key for SHA-256 request signatures
    pub api_key: String,

    /// Merchant secret for payment-link signatures
    pub secret_key: String,

    /// Base URL of the API
    pub api_url: String,

    /// Base URL of merchant payment pages
    pub merchant_url: String,

    /// HTTP client shared by every call (connection pool)
    pub http_client: Client,

    /// Port for callback sessions when none is passed explicitly
    pub callback_port: Option<u16>,

    /// Server used by [`AnypayClient::create_session`]
    pub callback_server: Arc<dyn CallbackServer>,
}

impl AnypayConfig {
    /// Creates a configuration with default URLs.
    ///
    /// # Examples
    ///
    /// ```
    /// use anypay_rs::client::AnypayConfig;
    ///
    /// let config = AnypayConfig::new("api-id", "api-key", "secret")
    ///     .with_api_url("https://anypay.io/api/")
    ///     .with_callback_port(8080);
    /// assert_eq!(config.callback_port, Some(8080));
    /// ```
    pub fn new(
        api_id: impl Into<String>,
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            api_id: api_id.into(),
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            merchant_url: DEFAULT_MERCHANT_URL.to_string(),
            http_client: Client::new(),
            callback_port: None,
            callback_server: Arc::new(AxumCallbackServer::new()),
        }
    }

    /// Reads the configuration from the environment.
    ///
    /// Uses `ANYPAY_API_ID`, `ANYPAY_API_KEY`, `ANYPAY_SECRET_KEY`, and
    /// optionally `ANYPAY_API_URL` and `PORT`. Missing credentials are left
    /// empty and rejected by [`AnypayClient::new`].
    pub fn from_env() -> Self {
        let var = |name: &str| env::var(name).unwrap_or_default();

        let mut config = Self::new(
            var("ANYPAY_API_ID"),
            var("ANYPAY_API_KEY"),
            var("ANYPAY_SECRET_KEY"),
        );
        if let Ok(api_url) = env::var("ANYPAY_API_URL") {
            config.api_url = api_url;
        }
        config.callback_port = env::var("PORT").ok().and_then(|p| p.parse().ok());
        config
    }

    /// Sets the API base URL.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Sets the merchant payment page URL.
    pub fn with_merchant_url(mut self, merchant_url: impl Into<String>) -> Self {
        self.merchant_url = merchant_url.into();
        self
    }

    /// Sets a custom HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    /// Sets the default callback port.
    pub fn with_callback_port(mut self, port: u16) -> Self {
        self.callback_port = Some(port);
        self
    }

    /// Sets the server used for callback sessions.
    pub fn with_callback_server(mut self, server: impl CallbackServer + 'static) -> Self {
        self.callback_server = Arc::new(server);
        self
    }
}

/// Signed client for the Anypay API.
///
/// Cheap to share across tasks: all state is immutable and the HTTP client
/// pools its own connections.
#[derive(Clone)]
pub struct AnypayClient {
    credentials: Credentials,
    api_url: String,
    merchant_url: String,
    http_client: Client,
    callback_port: u16,
    callback_server: Arc<dyn CallbackServer>,
}

impl AnypayClient {
    /// Creates a client, failing if any credential is missing or a URL is invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use anypay_rs::client::{AnypayClient, AnypayConfig};
    ///
    /// let client = AnypayClient::new(AnypayConfig::new("A1", "K1", "S")).unwrap();
    /// assert_eq!(client.api_url(), "https://anypay.io/api");
    ///
    /// assert!(AnypayClient::new(AnypayConfig::new("A1", "", "S")).is_err());
    /// ```
    pub fn new(config: AnypayConfig) -> Result<Self> {
        let credentials = Credentials::new(config.api_id, config.api_key, config.secret_key)?;

        Ok(Self {
            credentials,
            api_url: normalize_url(&config.api_url, "api")?,
            merchant_url: normalize_url(&config.merchant_url, "merchant")?,
            http_client: config.http_client,
            callback_port: config.callback_port.unwrap_or(DEFAULT_CALLBACK_PORT),
            callback_server: config.callback_server,
        })
    }

    /// Credentials this client signs with.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// API base URL, without a trailing slash.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn signer(&self) -> Signer<'_> {
        Signer::new(&self.credentials)
    }

    /// Account balance.
    pub async fn get_balance(&self) -> Result<ApiResponse> {
        self.account_call("balance").await
    }

    /// Current exchange rates.
    pub async fn get_rates(&self) -> Result<ApiResponse> {
        self.account_call("rates").await
    }

    /// Payment method commissions of a project.
    pub async fn get_commissions(&self, project_id: u64) -> Result<ApiResponse> {
        if project_id == 0 {
            return Err(ValidationError::MissingProjectId.into());
        }

        let project_id = project_id.to_string();
        let sign = self.signer().project("commissions", &project_id);
        self.build_and_send(&OperationRequest::with_params(
            "commissions",
            vec![
                ("sign".to_string(), sign),
                ("project_id".to_string(), project_id),
            ],
        ))
        .await
    }

    /// Payments of a project, starting at `offset`.
    pub async fn get_payments(&self, project_id: u64, offset: u64) -> Result<ApiResponse> {
        if project_id == 0 {
            return Err(ValidationError::MissingProjectId.into());
        }
        if offset == 0 {
            return Err(ValidationError::MissingOffset.into());
        }

        let project_id = project_id.to_string();
        let sign = self.signer().project("payments", &project_id);
        self.build_and_send(&OperationRequest::with_params(
            "payments",
            vec![
                ("sign".to_string(), sign),
                ("project_id".to_string(), project_id),
                ("offset".to_string(), offset.to_string()),
            ],
        ))
        .await
    }

    /// Payout history.
    pub async fn get_payouts(&self) -> Result<ApiResponse> {
        self.account_call("payouts").await
    }

    /// IP addresses the service sends notifications from.
    pub async fn get_ips(&self) -> Result<ApiResponse> {
        self.account_call("ip-notification").await
    }

    /// Creates a payout.
    ///
    /// The amount must be at least [`MIN_PAYOUT_AMOUNT`].
    pub async fn create_payout(&self, payout: &PayoutRequest) -> Result<ApiResponse> {
        validate_payout(payout)?;

        let sign = self.signer().payout(payout);
        self.build_and_send(&OperationRequest::with_params(
            "create-payout",
            payout_params(payout, sign),
        ))
        .await
    }

    /// Builds a signed merchant payment link. No request is sent.
    ///
    /// # Examples
    ///
    /// ```
    /// use anypay_rs::client::{AnypayClient, AnypayConfig};
    /// use anypay_rs::types::PaymentLinkRequest;
    ///
    /// let client = AnypayClient::new(AnypayConfig::new("A1", "K1", "S")).unwrap();
    /// let request = PaymentLinkRequest::new("5", 100.0, "RUB", "p1").with_param("foo", "bar");
    /// let link = client.create_payment_link(&request).unwrap();
    /// assert!(link.url.starts_with("https://anypay.io/merchant?merchant_id=5&amount=100"));
    /// ```
    pub fn create_payment_link(&self, link: &PaymentLinkRequest) -> Result<PaymentLink> {
        validate_payment_link(link)?;

        let built = build_payment_link(&self.merchant_url, link, &self.signer());
        tracing::debug!(elapsed_ms = built.elapsed_ms(), "payment link built");
        Ok(built)
    }

    /// Starts a callback server for payment notifications.
    ///
    /// The port is `port` if given, else the configured callback port, else
    /// [`DEFAULT_CALLBACK_PORT`].
    pub async fn create_session(
        &self,
        port: Option<u16>,
        params: SessionParams,
    ) -> Result<ServerHandle> {
        let config = CallbackConfig::new(params, self.resolve_port(port))?;
        self.callback_server.start(config).await
    }

    fn resolve_port(&self, port: Option<u16>) -> u16 {
        port.unwrap_or(self.callback_port)
    }

    /// Builds the target for `request`, sends it and returns the parsed reply.
    pub async fn build_and_send(&self, request: &OperationRequest) -> Result<ApiResponse> {
        let target = build_target(request, &self.api_url, self.credentials.api_id());
        tracing::debug!(method = %request.method, mode = ?request.mode(), "anypay call");
        dispatcher::send(&self.http_client, &target).await
    }

    async fn account_call(&self, operation: &str) -> Result<ApiResponse> {
        let sign = self.signer().account(operation);
        self.build_and_send(&OperationRequest::signed(operation, sign))
            .await
    }
}

fn normalize_url(raw: &str, name: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(AnypayError::ConfigError(format!("Invalid {} URL", name)));
    }
    Url::parse(trimmed)
        .map_err(|e| AnypayError::ConfigError(format!("Invalid {} URL '{}': {}", name, raw, e)))?;
    Ok(trimmed.to_string())
}

/// Keys of a payout query that the signature covers or carries.
const RESERVED_PAYOUT_KEYS: [&str; 5] = ["payout_id", "payout_type", "amount", "wallet", "sign"];

/// Fixed payout fields, then extras, then `sign`. Extras never override a
/// reserved key; a repeated extra key keeps its last value.
fn payout_params(payout: &PayoutRequest, sign: String) -> Params {
    let mut params: Params = vec![
        ("payout_id".to_string(), payout.payout_id.clone()),
        ("payout_type".to_string(), payout.payout_type.clone()),
        ("amount".to_string(), format_amount(payout.amount)),
        ("wallet".to_string(), payout.wallet.clone()),
    ];
    for (key, value) in &payout.extra {
        if RESERVED_PAYOUT_KEYS.contains(&key.as_str()) {
            continue;
        }
        match params.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value.clone(),
            None => params.push((key.clone(), value.clone())),
        }
    }
    params.push(("sign".to_string(), sign));
    params
}

fn validate_payment_link(link: &PaymentLinkRequest) -> Result<()> {
    if link.merchant.trim().is_empty() {
        return Err(ValidationError::MissingMerchant.into());
    }
    if !(link.amount.is_finite() && link.amount > 0.0) {
        return Err(ValidationError::InvalidAmount.into());
    }
    if link.currency.trim().is_empty() {
        return Err(ValidationError::MissingCurrency.into());
    }
    if link.pay_id.trim().is_empty() {
        return Err(ValidationError::MissingPayId.into());
    }
    if link.params.is_empty() {
        return Err(ValidationError::MissingLinkParams.into());
    }
    Ok(())
}

fn validate_payout(payout: &PayoutRequest) -> Result<()> {
    if payout.payout_id.trim().is_empty() {
        return Err(ValidationError::MissingPayoutId.into());
    }
    if payout.payout_type.trim().is_empty() {
        return Err(ValidationError::MissingPayoutType.into());
    }
    if payout.amount == 0.0 || payout.amount.is_nan() {
        return Err(ValidationError::MissingPayoutAmount.into());
    }
    if payout.amount.is_infinite() {
        return Err(ValidationError::InvalidAmount.into());
    }
    if payout.amount < MIN_PAYOUT_AMOUNT {
        return Err(ValidationError::PayoutBelowMinimum {
            amount: payout.amount,
            minimum: MIN_PAYOUT_AMOUNT,
        }
        .into());
    }
    if payout.wallet.trim().is_empty() {
        return Err(ValidationError::MissingWallet.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AnypayClient {
        AnypayClient::new(AnypayConfig::new("A1", "K1", "S")).unwrap()
    }

    fn validation(err: AnypayError) -> ValidationError {
        match err {
            AnypayError::Validation(v) => v,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_config_builders() {
        let config = AnypayConfig::new("A1", "K1", "S")
            .with_api_url("http://localhost:9000/api/")
            .with_merchant_url("http://localhost:9000/merchant")
            .with_callback_port(4000);

        let client = AnypayClient::new(config).unwrap();
        assert_eq!(client.api_url(), "http://localhost:9000/api");
        assert_eq!(client.resolve_port(None), 4000);
        assert_eq!(client.resolve_port(Some(5000)), 5000);
    }

    #[test]
    fn test_default_callback_port() {
        assert_eq!(client().resolve_port(None), DEFAULT_CALLBACK_PORT);
    }

    #[test]
    fn test_rejects_invalid_api_url() {
        let config = AnypayConfig::new("A1", "K1", "S").with_api_url("not a url");
        assert!(matches!(
            AnypayClient::new(config),
            Err(AnypayError::ConfigError(_))
        ));
    }

    #[test]
    fn test_payout_validation_order() {
        let ok = PayoutRequest::new("po-1", "card", 50.0, "4100");
        assert!(validate_payout(&ok).is_ok());

        let with = |edit: fn(&mut PayoutRequest)| {
            let mut payout = ok.clone();
            edit(&mut payout);
            payout
        };
        let cases = [
            (with(|p| p.payout_id.clear()), ValidationError::MissingPayoutId),
            (with(|p| p.payout_type.clear()), ValidationError::MissingPayoutType),
            (with(|p| p.amount = 0.0), ValidationError::MissingPayoutAmount),
            (with(|p| p.amount = f64::NAN), ValidationError::MissingPayoutAmount),
            (with(|p| p.amount = f64::INFINITY), ValidationError::InvalidAmount),
            (with(|p| p.wallet.clear()), ValidationError::MissingWallet),
        ];
        for (payout, expected) in cases {
            assert_eq!(validation(validate_payout(&payout).unwrap_err()), expected);
        }
    }

    #[test]
    fn test_payout_extras_cannot_shadow_signed_fields() {
        let payout = PayoutRequest::new("po-1", "card", 50.0, "4100")
            .with_field("amount", "1")
            .with_field("wallet", "attacker")
            .with_field("sign", "forged")
            .with_field("status_url", "https://a.example")
            .with_field("status_url", "https://b.example");

        let params = payout_params(&payout, "digest".to_string());
        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            ["payout_id", "payout_type", "amount", "wallet", "status_url", "sign"]
        );
        assert_eq!(params[2].1, "50");
        assert_eq!(params[3].1, "4100");
        assert_eq!(params[4].1, "https://b.example");
        assert_eq!(params[5].1, "digest");
    }

    #[test]
    fn test_payout_minimum_boundary() {
        let below = PayoutRequest::new("po-1", "card", 49.0, "4100");
        assert_eq!(
            validation(validate_payout(&below).unwrap_err()),
            ValidationError::PayoutBelowMinimum {
                amount: 49.0,
                minimum: 50.0
            }
        );

        let at_minimum = PayoutRequest::new("po-1", "card", 50.0, "4100");
        assert!(validate_payout(&at_minimum).is_ok());
    }

    #[test]
    fn test_payment_link_validation() {
        let ok = PaymentLinkRequest::new("5", 100.0, "RUB", "p1").with_param("foo", "bar");
        assert!(validate_payment_link(&ok).is_ok());

        let with = |edit: fn(&mut PaymentLinkRequest)| {
            let mut link = ok.clone();
            edit(&mut link);
            link
        };
        let cases = [
            (with(|l| l.merchant.clear()), ValidationError::MissingMerchant),
            (with(|l| l.amount = 0.0), ValidationError::InvalidAmount),
            (with(|l| l.currency.clear()), ValidationError::MissingCurrency),
            (with(|l| l.pay_id.clear()), ValidationError::MissingPayId),
            (with(|l| l.params.clear()), ValidationError::MissingLinkParams),
        ];
        for (link, expected) in cases {
            assert_eq!(validation(validate_payment_link(&link).unwrap_err()), expected);
        }
    }

    #[test]
    fn test_payment_link_is_idempotent() {
        let client = client();
        let link = PaymentLinkRequest::new("5", 100.0, "RUB", "p1").with_param("foo", "bar");
        let first = client.create_payment_link(&link).unwrap();
        let second = client.create_payment_link(&link).unwrap();
        assert_eq!(first.url, second.url);
        assert!(first.elapsed_ms() < 1000.0);
    }

    #[tokio::test]
    async fn test_project_calls_reject_zero_ids() {
        let client = client();
        assert_eq!(
            validation(client.get_commissions(0).await.unwrap_err()),
            ValidationError::MissingProjectId
        );
        assert_eq!(
            validation(client.get_payments(0, 10).await.unwrap_err()),
            ValidationError::MissingProjectId
        );
        assert_eq!(
            validation(client.get_payments(42, 0).await.unwrap_err()),
            ValidationError::MissingOffset
        );
    }
}
