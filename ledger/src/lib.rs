//! Read and write access to the XRP Ledger over a [`rlusd_network::Connection`].
//!
//! Every read targets the validated ledger. Nothing here caches: statuses are
//! recomputed on every call.

pub mod autofill;
pub mod client;
pub mod error;
pub mod funding;
pub mod resolver;
pub mod submit;

pub use autofill::{autofill, AutofillConfig};
pub use client::{AccountInfo, FeeInfo, LedgerClient, SubmitResult, TrustLine, TxLookup};
pub use error::LedgerError;
pub use funding::{wait_for_funding, FundingWait};
pub use resolver::AccountStatusResolver;
pub use submit::{submit_and_wait, SubmitConfig, ValidatedTx, SUCCESS_CODE};
