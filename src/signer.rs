//! Request signatures.
//!
//! Every authenticated call carries a lowercase hex SHA-256 digest over the
//! plain concatenation of the operation name, its parameters and the
//! credential fields it needs, in an order fixed per operation. Payment links
//! use a separate colon-joined MD5 scheme keyed by the merchant secret.
//!
//! Signatures are computed fresh for every call and are never logged.

use crate::types::{format_amount, Credentials, PaymentLinkRequest, PayoutRequest};
use sha2::{Digest, Sha256};

/// Digest algorithm used for a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignScheme {
    /// Server-authenticated API calls
    Sha256,
    /// Merchant payment links
    Md5,
}

/// Hashes `input` and returns the lowercase hex digest.
pub fn digest(input: &str, scheme: SignScheme) -> String {
    match scheme {
        SignScheme::Sha256 => hex::encode(Sha256::digest(input.as_bytes())),
        SignScheme::Md5 => format!("{:x}", md5::compute(input.as_bytes())),
    }
}

/// Signs `operation` followed by `fields`, concatenated without separators.
///
/// # Examples
///
/// ```
/// use anypay_rs::signer::{sign, digest, SignScheme};
///
/// let sign = sign("balance", &["A1", "K1"], SignScheme::Sha256);
/// assert_eq!(sign, digest("balanceA1K1", SignScheme::Sha256));
/// ```
pub fn sign(operation: &str, fields: &[&str], scheme: SignScheme) -> String {
    let mut input = String::from(operation);
    for field in fields {
        input.push_str(field);
    }
    digest(&input, scheme)
}

/// Per-operation signature recipes bound to one credential set.
#[derive(Debug, Clone, Copy)]
pub struct Signer<'a> {
    credentials: &'a Credentials,
}

impl<'a> Signer<'a> {
    /// Creates a signer over the given credentials.
    pub fn new(credentials: &'a Credentials) -> Self {
        Self { credentials }
    }

    /// `operation, apiId, apiKey`: balance, rates, payouts, ip-notification.
    pub fn account(&self, operation: &str) -> String {
        sign(
            operation,
            &[self.credentials.api_id(), self.credentials.api_key()],
            SignScheme::Sha256,
        )
    }

    /// `operation, apiId, projectId, apiKey`: commissions, payments.
    pub fn project(&self, operation: &str, project_id: &str) -> String {
        sign(
            operation,
            &[
                self.credentials.api_id(),
                project_id,
                self.credentials.api_key(),
            ],
            SignScheme::Sha256,
        )
    }

    /// `create-payout, apiId, payoutId, payoutType, amount, wallet, apiKey`.
    pub fn payout(&self, payout: &PayoutRequest) -> String {
        let amount = format_amount(payout.amount);
        sign(
            "create-payout",
            &[
                self.credentials.api_id(),
                &payout.payout_id,
                &payout.payout_type,
                &amount,
                &payout.wallet,
                self.credentials.api_key(),
            ],
            SignScheme::Sha256,
        )
    }

    /// MD5 over `currency:amount:secretKey:merchant:payId`.
    pub fn payment_link(&self, link: &PaymentLinkRequest) -> String {
        let input = format!(
            "{}:{}:{}:{}:{}",
            link.currency,
            format_amount(link.amount),
            self.credentials.secret_key(),
            link.merchant,
            link.pay_id
        );
        digest(&input, SignScheme::Md5)
    }
}
