//! JSON-RPC over HTTP transport to a rippled server.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use crate::error::NetworkError;
use crate::response;
use crate::transport::Transport;

/// HTTP client bound to one server's JSON-RPC port.
#[derive(Clone)]
pub struct JsonRpcTransport {
    http: reqwest::Client,
    endpoint: String,
    request_timeout: Duration,
}

impl JsonRpcTransport {
    /// Build the client and confirm the server answers `server_info`.
    pub async fn connect(endpoint: &Url, request_timeout: Duration) -> Result<Self, NetworkError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NetworkError::Transport(format!("failed to create HTTP client: {e}")))?;
        let transport = Self {
            http,
            endpoint: endpoint.to_string(),
            request_timeout,
        };
        transport
            .request("server_info", json!({}))
            .await
            .map_err(|e| NetworkError::ConnectionFailed {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;
        Ok(transport)
    }
}

#[async_trait]
impl Transport for JsonRpcTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, command: &str, params: Value) -> Result<Value, NetworkError> {
        let params = if params.is_null() { json!({}) } else { params };
        let body = json!({ "method": command, "params": [params] });
        let reply = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NetworkError::Timeout {
                        command: command.to_string(),
                        secs: self.request_timeout.as_secs(),
                    }
                } else {
                    NetworkError::Transport(format!("request failed: {e}"))
                }
            })?;

        if !reply.status().is_success() {
            return Err(NetworkError::Transport(format!(
                "server returned HTTP {}",
                reply.status()
            )));
        }

        let json: Value = reply
            .json()
            .await
            .map_err(|e| NetworkError::InvalidResponse(format!("invalid JSON response: {e}")))?;
        response::from_json_rpc(&json)
    }

    async fn close(&self) -> Result<(), NetworkError> {
        Ok(())
    }
}
