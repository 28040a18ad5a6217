use rlusd_crypto::CryptoError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("amount {0} cannot be represented with 16 significant digits")]
    Precision(String),

    #[error("amount exponent out of range: {0}")]
    ExponentRange(i32),

    #[error("XRP amount exceeds maximum: {0} drops")]
    XrpOverflow(u64),

    #[error("unexpected end of input at offset {0}")]
    Truncated(usize),

    #[error("unknown field: type {type_code}, field {field_code}")]
    UnknownField { type_code: u8, field_code: u8 },

    #[error("unknown transaction type code: {0}")]
    UnknownTransactionType(u16),

    #[error("invalid field content: {0}")]
    InvalidField(&'static str),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("signing failed: {0}")]
    Signing(#[from] CryptoError),
}
