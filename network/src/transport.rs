//! The seam between connection management and sockets.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::error::NetworkError;
use crate::jsonrpc::JsonRpcTransport;
use crate::ws::WsTransport;

/// An open channel to one ledger server.
#[async_trait]
pub trait Transport: Send + Sync {
    /// The endpoint this transport is bound to.
    fn endpoint(&self) -> &str;

    /// Issue `command` with `params` (a JSON object) and return its `result`.
    async fn request(&self, command: &str, params: Value) -> Result<Value, NetworkError>;

    /// Gracefully shut the channel down.
    async fn close(&self) -> Result<(), NetworkError>;
}

/// Opens a [`Transport`] for an endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn Transport>, NetworkError>;
}

/// Connects over WebSocket for `ws(s)://` and JSON-RPC for `http(s)://`.
#[derive(Clone, Debug)]
pub struct XrplConnector {
    pub request_timeout: Duration,
}

impl Default for XrplConnector {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(20),
        }
    }
}

#[async_trait]
impl Connector for XrplConnector {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn Transport>, NetworkError> {
        match endpoint.scheme() {
            "ws" | "wss" => Ok(Box::new(
                WsTransport::connect(endpoint, self.request_timeout).await?,
            )),
            "http" | "https" => Ok(Box::new(
                JsonRpcTransport::connect(endpoint, self.request_timeout).await?,
            )),
            other => Err(NetworkError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: format!("unsupported scheme {other}"),
            }),
        }
    }
}
