//! What a caller wants the ledger to do.
//!
//! Intents are built from validated types only, so an intent that exists is
//! always well-formed. Account-state preconditions are checked elsewhere.

use serde::{Deserialize, Serialize};
use rlusd_types::{Address, CurrencyCode, TokenAmount};

use crate::error::CodecError;

/// Transaction type and its ledger code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxKind {
    Payment,
    TrustSet,
}

impl TxKind {
    pub fn code(self) -> u16 {
        match self {
            Self::Payment => 0,
            Self::TrustSet => 20,
        }
    }

    pub fn from_code(code: u16) -> Result<Self, CodecError> {
        match code {
            0 => Ok(Self::Payment),
            20 => Ok(Self::TrustSet),
            other => Err(CodecError::UnknownTransactionType(other)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Payment => "Payment",
            Self::TrustSet => "TrustSet",
        }
    }
}

/// Create or update a trustline to `issuer` for `currency`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrustSetIntent {
    pub currency: CurrencyCode,
    pub issuer: Address,
    pub limit: TokenAmount,
}

/// Deliver `amount` of an issued currency to `destination`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentIntent {
    pub currency: CurrencyCode,
    pub issuer: Address,
    pub destination: Address,
    pub amount: TokenAmount,
    pub destination_tag: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxIntent {
    TrustSet(TrustSetIntent),
    Payment(PaymentIntent),
}

impl TxIntent {
    pub fn trust_set(currency: CurrencyCode, issuer: Address, limit: TokenAmount) -> Self {
        Self::TrustSet(TrustSetIntent {
            currency,
            issuer,
            limit,
        })
    }

    pub fn payment(
        currency: CurrencyCode,
        issuer: Address,
        destination: Address,
        amount: TokenAmount,
        destination_tag: Option<u32>,
    ) -> Self {
        Self::Payment(PaymentIntent {
            currency,
            issuer,
            destination,
            amount,
            destination_tag,
        })
    }

    pub fn kind(&self) -> TxKind {
        match self {
            Self::TrustSet(_) => TxKind::TrustSet,
            Self::Payment(_) => TxKind::Payment,
        }
    }
}
