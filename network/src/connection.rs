//! Connection handle and ordered endpoint fallback.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::endpoint::EndpointSet;
use crate::error::NetworkError;
use crate::transport::{Connector, Transport};

/// A connection bound to one endpoint for its whole lifetime.
///
/// Dropping the handle drops the underlying socket. [`Connection::close`]
/// performs a graceful shutdown and may be called any number of times.
pub struct Connection {
    endpoint: String,
    transport: Option<Box<dyn Transport>>,
}

impl Connection {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            endpoint: transport.endpoint().to_string(),
            transport: Some(transport),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    pub async fn request(&self, command: &str, params: Value) -> Result<Value, NetworkError> {
        let transport = self.transport.as_ref().ok_or(NetworkError::Closed)?;
        debug!(endpoint = %self.endpoint, command, "ledger request");
        transport.request(command, params).await
    }

    pub async fn close(&mut self) {
        if let Some(transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                debug!(endpoint = %self.endpoint, error = %e, "error while closing connection");
            }
            info!(endpoint = %self.endpoint, "disconnected");
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.endpoint)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Try each endpoint once, in order, and return the first that connects.
pub async fn open(
    endpoints: &EndpointSet,
    connector: &dyn Connector,
) -> Result<Connection, NetworkError> {
    let mut last_error = NetworkError::NoEndpoints;
    let mut attempted = 0;
    for endpoint in endpoints.iter() {
        attempted += 1;
        info!(%endpoint, "attempting to connect");
        match connector.connect(endpoint).await {
            Ok(transport) => {
                info!(%endpoint, "connected");
                return Ok(Connection::new(transport));
            }
            Err(e) => {
                warn!(%endpoint, error = %e, "failed to connect");
                last_error = e;
            }
        }
    }
    Err(NetworkError::AllEndpointsFailed {
        attempted,
        last_error: last_error.to_string(),
    })
}
