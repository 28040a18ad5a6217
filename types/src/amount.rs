//! Token and XRP amounts.
//!
//! Issued-token amounts are decimals, never floats. Balances reported by the
//! ledger are compared through [`parse_decimal`] so that `"10"` and
//! `"10.000"` are equal and `"9"` is less than `"10"`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Drops per XRP.
pub const DROPS_PER_XRP: u64 = 1_000_000;

/// Parse a decimal string as reported by the ledger or typed by a user.
///
/// Accepts plain (`"12.5"`) and scientific (`"1.25e1"`) notation.
pub fn parse_decimal(raw: &str) -> Result<Decimal, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidAmount(raw.to_string()));
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map(|d| d.normalize())
        .map_err(|_| ValidationError::InvalidAmount(raw.to_string()))
}

/// Convert a drops string to an exact XRP decimal string.
pub fn drops_to_xrp(drops: &str) -> Result<String, ValidationError> {
    let value: u64 = drops
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidAmount(drops.to_string()))?;
    let xrp = Decimal::from(value) / Decimal::from(DROPS_PER_XRP);
    Ok(xrp.normalize().to_string())
}

/// Convert an XRP decimal to drops, rejecting sub-drop precision.
pub fn xrp_to_drops(xrp: Decimal) -> Option<u64> {
    let drops = xrp.checked_mul(Decimal::from(DROPS_PER_XRP))?;
    if drops.fract() != Decimal::ZERO || drops.is_sign_negative() {
        return None;
    }
    u64::try_from(drops).ok()
}

/// A strictly positive issued-token amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenAmount(Decimal);

impl TokenAmount {
    /// Parse a positive amount with no upper bound beyond decimal range.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let value = parse_decimal(raw)?;
        if value <= Decimal::ZERO {
            return Err(ValidationError::InvalidAmount(raw.to_string()));
        }
        Ok(Self(value))
    }

    /// Parse a positive amount that must not exceed `ceiling`.
    pub fn parse_with_ceiling(raw: &str, ceiling: Decimal) -> Result<Self, ValidationError> {
        let amount = Self::parse(raw)?;
        if amount.0 > ceiling {
            return Err(ValidationError::AmountAboveCeiling {
                amount: amount.to_string(),
                ceiling: ceiling.normalize().to_string(),
            });
        }
        Ok(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Plain decimal text without trailing zeros, as sent to the ledger.
    pub fn to_ledger_string(&self) -> String {
        self.0.normalize().to_string()
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ledger_string())
    }
}

impl TryFrom<String> for TokenAmount {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TokenAmount> for String {
    fn from(amount: TokenAmount) -> Self {
        amount.to_ledger_string()
    }
}
