//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use rlusd_ledger::LedgerError;
use rlusd_network::NetworkError;
use rlusd_types::ValidationError;
use rlusd_wallet_core::WalletError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input or missing configuration.
    #[error("{0}")]
    BadRequest(String),

    /// The ledger state rules the operation out.
    #[error("{0}")]
    AccountState(String),

    /// The ledger could not be reached or refused the transaction.
    #[error("{message}")]
    Ledger {
        message: String,
        result_code: Option<String>,
    },

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn no_wallet() -> Self {
        Self::BadRequest("No wallet configured".into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::AccountState(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Ledger { .. } => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "internal error");
        }
        let body = match &self {
            Self::Ledger {
                message,
                result_code: Some(code),
            } => json!({ "error": message, "resultCode": code }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<NetworkError> for ApiError {
    fn from(e: NetworkError) -> Self {
        Self::Ledger {
            message: e.to_string(),
            result_code: None,
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Validation(v) => v.into(),
            LedgerError::AccountNotFound(_) => Self::AccountState(e.to_string()),
            LedgerError::Codec(_) => Self::Internal(e.to_string()),
            other => Self::Ledger {
                result_code: other.result_code().map(str::to_string),
                message: other.to_string(),
            },
        }
    }
}

impl From<WalletError> for ApiError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::Validation(v) => v.into(),
            WalletError::Crypto(_) | WalletError::SeedMismatch { .. } => {
                Self::BadRequest(e.to_string())
            }
            WalletError::AccountState(_) => Self::AccountState(e.to_string()),
            WalletError::Ledger(l) => l.into(),
            other => Self::Internal(other.to_string()),
        }
    }
}
