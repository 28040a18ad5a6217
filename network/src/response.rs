//! Normalisation of rippled responses.
//!
//! WebSocket replies carry `status` at the top level next to `result`;
//! JSON-RPC replies carry `status` inside `result`. Both report failures with
//! `error`, `error_code` and `error_message`.

use serde_json::Value;

use crate::error::NetworkError;

/// Turn a status-bearing object into its result or an [`NetworkError::Api`].
///
/// `envelope` is the object holding `status`/`error`; `result` is where the
/// payload lives on success.
pub fn classify(envelope: &Value, result: Option<&Value>) -> Result<Value, NetworkError> {
    let status = envelope.get("status").and_then(Value::as_str);
    if status == Some("error") || envelope.get("error").is_some() {
        return Err(NetworkError::Api {
            error: envelope
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
            code: envelope.get("error_code").and_then(Value::as_i64),
            message: envelope
                .get("error_message")
                .and_then(Value::as_str)
                .map(str::to_string),
        });
    }
    result
        .cloned()
        .ok_or_else(|| NetworkError::InvalidResponse("missing result".into()))
}

/// A WebSocket reply: `{"id", "status", "result" | "error"}`.
pub fn from_ws(reply: &Value) -> Result<Value, NetworkError> {
    classify(reply, reply.get("result"))
}

/// A JSON-RPC reply: `{"result": {"status", ...}}`.
pub fn from_json_rpc(reply: &Value) -> Result<Value, NetworkError> {
    let result = reply
        .get("result")
        .ok_or_else(|| NetworkError::InvalidResponse("missing result".into()))?;
    classify(result, Some(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ws_success_returns_result() {
        let reply = json!({"id": 1, "status": "success", "type": "response", "result": {"ledger_index": 5}});
        assert_eq!(from_ws(&reply).unwrap(), json!({"ledger_index": 5}));
    }

    #[test]
    fn ws_error_is_api_error() {
        let reply = json!({
            "id": 2,
            "status": "error",
            "error": "actNotFound",
            "error_code": 19,
            "error_message": "Account not found."
        });
        let err = from_ws(&reply).unwrap_err();
        assert!(err.is_api_error("actNotFound"));
        assert_eq!(
            err,
            NetworkError::Api {
                error: "actNotFound".into(),
                code: Some(19),
                message: Some("Account not found.".into()),
            }
        );
    }

    #[test]
    fn json_rpc_error_inside_result() {
        let reply = json!({"result": {"status": "error", "error": "actNotFound", "error_code": 19}});
        assert!(from_json_rpc(&reply).unwrap_err().is_api_error("actNotFound"));
        let ok = json!({"result": {"status": "success", "drops": {}}});
        assert_eq!(from_json_rpc(&ok).unwrap()["status"], "success");
    }
}
