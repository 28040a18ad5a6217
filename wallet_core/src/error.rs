use thiserror::Error;

use rlusd_crypto::CryptoError;
use rlusd_ledger::LedgerError;
use rlusd_network::NetworkError;
use rlusd_transactions::CodecError;
use rlusd_types::ValidationError;

/// Ledger state that makes an operation impossible before anything is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountStateError {
    #[error("sender account {0} does not exist on ledger")]
    SenderMissing(String),

    #[error("sender {address} does not have a {currency} trustline")]
    SenderNoTrustline { address: String, currency: String },

    #[error("insufficient {currency} balance. Available: {available}, requested: {requested}")]
    InsufficientBalance {
        currency: String,
        available: String,
        requested: String,
    },

    #[error("destination account {0} does not exist on ledger")]
    DestinationMissing(String),

    #[error("destination {address} does not have a {currency} trustline; they must set one up first")]
    DestinationNoTrustline { address: String, currency: String },
}

#[derive(Debug, Error)]
pub enum WalletError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    AccountState(#[from] AccountStateError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("key error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("serialization error: {0}")]
    Codec(#[from] CodecError),

    #[error("seed derives {derived}, expected {expected}")]
    SeedMismatch { expected: String, derived: String },

    #[error("transaction account {tx_account} is not this wallet ({wallet})")]
    AccountMismatch { tx_account: String, wallet: String },

    #[error("keystore error: {0}")]
    Keystore(String),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<NetworkError> for WalletError {
    fn from(e: NetworkError) -> Self {
        Self::Ledger(LedgerError::Network(e))
    }
}

impl WalletError {
    /// The raw ledger result code of a rejected transaction.
    pub fn result_code(&self) -> Option<&str> {
        match self {
            Self::Ledger(e) => e.result_code(),
            _ => None,
        }
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
