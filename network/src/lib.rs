//! Connections to XRP Ledger servers.
//!
//! [`open`] walks an [`EndpointSet`] in order and returns a [`Connection`]
//! bound to the first endpoint that accepts. The actual socket is behind the
//! [`Transport`] trait, produced by a [`Connector`], so the fallback logic can
//! be driven by fake transports in tests.

pub mod connection;
pub mod endpoint;
pub mod error;
pub mod jsonrpc;
pub mod response;
pub mod transport;
pub mod ws;

pub use connection::{open, Connection};
pub use endpoint::EndpointSet;
pub use error::NetworkError;
pub use jsonrpc::JsonRpcTransport;
pub use transport::{Connector, Transport, XrplConnector};
pub use ws::WsTransport;
