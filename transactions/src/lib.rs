//! Transactions understood by RLUSD Desk and their wire form.
//!
//! Transaction types:
//! - **TrustSet**: opt an account in to holding an issued currency
//! - **Payment**: move an issued currency between two accounts
//!
//! A [`TxIntent`] is what the caller wants. Autofill turns it into a
//! [`PreparedTx`] carrying sequence, fee and expiry, which [`sign_prepared`]
//! serializes and signs into a [`SignedTx`].

pub mod amount;
pub mod codec;
pub mod error;
pub mod field;
pub mod intent;
pub mod prepared;
pub mod signing;

pub use amount::LedgerAmount;
pub use codec::{decode, encode, DecodedTx};
pub use error::CodecError;
pub use intent::{PaymentIntent, TrustSetIntent, TxIntent, TxKind};
pub use prepared::PreparedTx;
pub use signing::{sign_prepared, signing_payload, transaction_hash, SignedTx};
