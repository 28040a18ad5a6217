//! HTTP API for the RLUSD desk.
//!
//! Provides endpoints for:
//! - Reading and updating the active profile (issuer, currency, wallet)
//! - Account and trustline status for the desk wallet or any address
//! - Trustline setup and guarded payments from the desk wallet
//! - The transaction log, as JSON or CSV
//! - Address validation

pub mod error;
pub mod extract;
pub mod handlers;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{router, RpcServer};
pub use state::{AppState, Profile, ServerSettings};
