//! WebSocket transport to a rippled server.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::trace;
use url::Url;

use crate::error::NetworkError;
use crate::response;
use crate::transport::Transport;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One WebSocket to one server. Requests are serialized over the socket and
/// matched to replies by `id`; unsolicited stream messages are skipped.
pub struct WsTransport {
    endpoint: String,
    socket: Mutex<Option<Socket>>,
    next_id: AtomicU64,
    request_timeout: Duration,
}

impl WsTransport {
    pub async fn connect(endpoint: &Url, request_timeout: Duration) -> Result<Self, NetworkError> {
        let failed = |reason: String| NetworkError::ConnectionFailed {
            endpoint: endpoint.to_string(),
            reason,
        };
        let (socket, _response) = timeout(request_timeout, connect_async(endpoint.as_str()))
            .await
            .map_err(|_| failed("connect timeout".into()))?
            .map_err(|e| failed(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            socket: Mutex::new(Some(socket)),
            next_id: AtomicU64::new(1),
            request_timeout,
        })
    }

    async fn exchange(socket: &mut Socket, id: u64, text: String) -> Result<Value, NetworkError> {
        socket
            .send(Message::Text(text))
            .await
            .map_err(|e| NetworkError::Transport(format!("send failed: {e}")))?;
        loop {
            let message = socket
                .next()
                .await
                .ok_or(NetworkError::Closed)?
                .map_err(|e| NetworkError::Transport(format!("receive failed: {e}")))?;
            let text = match message {
                Message::Text(text) => text,
                Message::Binary(data) => String::from_utf8_lossy(&data).into_owned(),
                Message::Ping(data) => {
                    socket
                        .send(Message::Pong(data))
                        .await
                        .map_err(|e| NetworkError::Transport(format!("pong failed: {e}")))?;
                    continue;
                }
                Message::Close(_) => return Err(NetworkError::Closed),
                Message::Pong(_) | Message::Frame(_) => continue,
            };
            let reply: Value = serde_json::from_str(&text)
                .map_err(|e| NetworkError::InvalidResponse(e.to_string()))?;
            if reply.get("id").and_then(Value::as_u64) == Some(id) {
                return Ok(reply);
            }
            trace!(?reply, "skipping unsolicited message");
        }
    }
}

#[async_trait]
impl Transport for WsTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, command: &str, params: Value) -> Result<Value, NetworkError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut body = match params {
            Value::Object(map) => map,
            Value::Null => Default::default(),
            _ => return Err(NetworkError::InvalidResponse("params must be a JSON object".into())),
        };
        body.insert("id".into(), json!(id));
        body.insert("command".into(), json!(command));
        let text = Value::Object(body).to_string();

        let mut guard = self.socket.lock().await;
        let socket = guard.as_mut().ok_or(NetworkError::Closed)?;
        let reply = timeout(self.request_timeout, Self::exchange(socket, id, text))
            .await
            .map_err(|_| NetworkError::Timeout {
                command: command.to_string(),
                secs: self.request_timeout.as_secs(),
            })??;
        response::from_ws(&reply)
    }

    async fn close(&self) -> Result<(), NetworkError> {
        let mut guard = self.socket.lock().await;
        if let Some(mut socket) = guard.take() {
            socket
                .close(None)
                .await
                .map_err(|e| NetworkError::Transport(format!("close failed: {e}")))?;
        }
        Ok(())
    }
}
