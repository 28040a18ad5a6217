use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("endpoint set is empty")]
    NoEndpoints,

    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("failed to connect to {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    #[error("failed to connect to any ledger server ({attempted} tried). Last error: {last_error}")]
    AllEndpointsFailed { attempted: usize, last_error: String },

    #[error("request {command} timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("connection closed")]
    Closed,

    #[error("ledger error {error}: {}", message.as_deref().unwrap_or("no message"))]
    Api {
        error: String,
        code: Option<i64>,
        message: Option<String>,
    },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl NetworkError {
    /// Whether this is a ledger API error with the given token, e.g. `actNotFound`.
    pub fn is_api_error(&self, token: &str) -> bool {
        matches!(self, Self::Api { error, .. } if error == token)
    }
}
