//! Nullable infrastructure for deterministic testing.
//!
//! [`NullLedger`] stands in for a rippled server behind the
//! [`rlusd_network::Connector`] and [`rlusd_network::Transport`] traits. It:
//! - Answers the commands the workflows use from in-memory state
//! - Decodes submitted blobs and applies TrustSet and Payment effects
//! - Records every connection attempt, request and submission
//! - Never touches the network
//!
//! Usage: hand a `NullLedger` to any code that takes a `&dyn Connector`.

pub mod ledger;

pub use ledger::{NullLedger, NullTrustline, NULL_HOST};
