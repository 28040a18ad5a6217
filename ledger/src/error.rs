use rlusd_network::NetworkError;
use rlusd_transactions::CodecError;
use rlusd_types::ValidationError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("transaction {hash} failed: {code}")]
    Rejected { code: String, hash: String },

    #[error("transaction {hash} not validated before ledger {last_ledger_sequence}")]
    Expired {
        hash: String,
        last_ledger_sequence: u32,
    },

    #[error("account {address} not funded after {waited_secs}s")]
    FundingTimeout { address: String, waited_secs: u64 },

    #[error("invalid ledger response: {0}")]
    InvalidResponse(String),

    #[error("serialization error: {0}")]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl LedgerError {
    /// The raw ledger result code, when the ledger answered with one.
    pub fn result_code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => Some(code),
            _ => None,
        }
    }
}
