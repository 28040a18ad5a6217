//! Validation errors for user-supplied ledger inputs.

use thiserror::Error;

/// Raised when an input cannot describe a ledger object.
///
/// Every variant is detected locally, before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("amount {amount} exceeds safety limit of {ceiling}")]
    AmountAboveCeiling { amount: String, ceiling: String },

    #[error("invalid currency code: {0}")]
    InvalidCurrency(String),

    #[error("invalid currency hex (must be 40 hex characters): {0}")]
    InvalidCurrencyHex(String),

    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    #[error("invalid destination tag: {0}")]
    InvalidTag(String),

    #[error("invalid transaction hash: {0}")]
    InvalidHash(String),

    #[error("unknown network: {0}")]
    InvalidNetwork(String),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("{0} required")]
    MissingField(&'static str),
}
