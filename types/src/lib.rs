//! Fundamental types for RLUSD Desk.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! ledger addresses, currency codes, token amounts, hashes, account statuses and the
//! validation errors raised when user input does not describe any of them.

pub mod address;
pub mod amount;
pub mod base58;
pub mod currency;
pub mod error;
pub mod hash;
pub mod keys;
pub mod network;
pub mod params;
pub mod status;

pub use address::{AccountId, Address};
pub use amount::{drops_to_xrp, parse_decimal, xrp_to_drops, TokenAmount, DROPS_PER_XRP};
pub use currency::CurrencyCode;
pub use error::ValidationError;
pub use hash::TxHash;
pub use keys::{KeyType, PrivateKey, PublicKey, Seed};
pub use network::Network;
pub use params::XrpRequirements;
pub use status::{AccountReport, AccountStatus, TrustlineStatus};

pub use rust_decimal::Decimal;
