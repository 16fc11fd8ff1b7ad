//! Error types for the anypay-rs library.
//!
//! Configuration and validation failures are raised before any signature is
//! computed or any request leaves the process. Dispatch failures come back
//! from the single network attempt made per call.

use thiserror::Error;

/// Main error type for Anypay operations.
#[derive(Error, Debug)]
pub enum AnypayError {
    /// Client construction failed because a credential or URL was missing
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Caller-supplied arguments were rejected before any network attempt
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Error during HTTP request/response handling
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The response body was not valid JSON
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The callback server could not be started
    #[error("Callback server error: {0}")]
    ServerError(#[from] std::io::Error),
}

impl AnypayError {
    /// Returns `true` for failures of the network exchange or of parsing its reply.
    pub fn is_dispatch(&self) -> bool {
        matches!(self, AnypayError::HttpError(_) | AnypayError::JsonError(_))
    }

    /// Returns `true` if the error was raised by argument validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, AnypayError::Validation(_))
    }
}

/// Reasons an operation rejects its arguments.
///
/// Each variant carries its own message so callers can report it directly.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Payment link without a merchant id
    #[error("Invalid merchant id")]
    MissingMerchant,

    /// Amount missing, zero or not finite
    #[error("Invalid amount")]
    InvalidAmount,

    /// Payment link without a currency
    #[error("Invalid currency")]
    MissingCurrency,

    /// Payment link without a pay id
    #[error("Invalid pay id")]
    MissingPayId,

    /// Payment link without extra parameters
    #[error("Specify parameter / parameters")]
    MissingLinkParams,

    /// Project-scoped call without a project id
    #[error("Invalid project id")]
    MissingProjectId,

    /// Payment list without an offset
    #[error("Specify the amount needed to select specific subset transactions")]
    MissingOffset,

    /// Payout without the merchant-side payout number
    #[error("You did not enter a unique payout number in the seller's system")]
    MissingPayoutId,

    /// Payout without a payout type
    #[error("Specify the payout type")]
    MissingPayoutType,

    /// Payout without an amount
    #[error("You did not specify the withdrawal amount")]
    MissingPayoutAmount,

    /// Payout amount under the service minimum
    #[error("The minimum withdrawal of funds is {minimum}, got {amount}")]
    PayoutBelowMinimum {
        /// Requested amount
        amount: f64,
        /// Smallest amount the service accepts
        minimum: f64,
    },

    /// Payout without a destination wallet
    #[error("Enter wallet / card number")]
    MissingWallet,

    /// Callback session without the notification path
    #[error("You did not indicate what address the requests will come to")]
    MissingSessionUrl,
}

/// Result type alias for Anypay operations.
pub type Result<T> = std::result::Result<T, AnypayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnypayError::ConfigError("Invalid apiId".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid apiId");

        let err: AnypayError = ValidationError::MissingWallet.into();
        assert_eq!(err.to_string(), "Validation error: Enter wallet / card number");
    }

    #[test]
    fn test_below_minimum_is_distinct() {
        let below = ValidationError::PayoutBelowMinimum {
            amount: 49.0,
            minimum: 50.0,
        };
        assert_ne!(below, ValidationError::MissingPayoutAmount);
        assert_eq!(
            below.to_string(),
            "The minimum withdrawal of funds is 50, got 49"
        );
    }

    #[test]
    fn test_error_classification() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: AnypayError = json_err.into();
        assert!(err.is_dispatch());
        assert!(!err.is_validation());

        let err: AnypayError = ValidationError::MissingProjectId.into();
        assert!(err.is_validation());
        assert!(!err.is_dispatch());
    }
}
