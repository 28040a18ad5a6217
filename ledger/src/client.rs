//! Typed wrappers over the ledger commands used by the desk.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use rlusd_network::Connection;
use rlusd_types::Address;

use crate::error::LedgerError;

/// Ledger state pinned by every read.
pub const VALIDATED: &str = "validated";

/// `account_info.account_data`, the fields the desk reads.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AccountInfo {
    #[serde(rename = "Balance")]
    pub balance_drops: String,
    #[serde(rename = "Sequence")]
    pub sequence: u32,
    #[serde(rename = "OwnerCount", default)]
    pub owner_count: u32,
}

/// One entry of `account_lines.lines`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TrustLine {
    pub account: String,
    pub balance: String,
    pub currency: String,
    pub limit: String,
}

#[derive(Deserialize)]
struct AccountLinesPage {
    #[serde(default)]
    lines: Vec<TrustLine>,
    #[serde(default)]
    marker: Option<Value>,
}

/// `fee.drops`, in drops.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeeInfo {
    pub base_fee: u64,
    pub open_ledger_fee: u64,
}

/// Preliminary outcome of `submit`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SubmitResult {
    pub engine_result: String,
    #[serde(default)]
    pub engine_result_message: String,
}

/// Outcome of a `tx` lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxLookup {
    NotFound,
    Pending,
    Validated { ledger_index: u32, result_code: String },
}

/// Borrowing wrapper that issues typed requests over a connection.
#[derive(Clone, Copy)]
pub struct LedgerClient<'a> {
    conn: &'a Connection,
}

impl<'a> LedgerClient<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// `account_info` at the validated ledger; `None` when the account does not exist.
    pub async fn account_info(&self, address: &Address) -> Result<Option<AccountInfo>, LedgerError> {
        let reply = self
            .conn
            .request(
                "account_info",
                json!({ "account": address.as_str(), "ledger_index": VALIDATED }),
            )
            .await;
        match reply {
            Ok(result) => Ok(Some(field(&result, "account_data")?)),
            Err(e) if e.is_api_error("actNotFound") => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All trust lines between `address` and `peer`, following pagination markers.
    pub async fn account_lines(
        &self,
        address: &Address,
        peer: &Address,
    ) -> Result<Vec<TrustLine>, LedgerError> {
        let mut lines = Vec::new();
        let mut marker: Option<Value> = None;
        loop {
            let mut params = json!({
                "account": address.as_str(),
                "peer": peer.as_str(),
                "ledger_index": VALIDATED,
            });
            if let Some(m) = marker.take() {
                params["marker"] = m;
            }
            let page: AccountLinesPage = parse(self.conn.request("account_lines", params).await?)?;
            lines.extend(page.lines);
            match page.marker {
                Some(m) if !m.is_null() => marker = Some(m),
                _ => return Ok(lines),
            }
        }
    }

    pub async fn fee(&self) -> Result<FeeInfo, LedgerError> {
        let result = self.conn.request("fee", json!({})).await?;
        let drops = result
            .get("drops")
            .ok_or_else(|| LedgerError::InvalidResponse("fee: missing drops".into()))?;
        Ok(FeeInfo {
            base_fee: drops_field(drops, "base_fee")?,
            open_ledger_fee: drops_field(drops, "open_ledger_fee")?,
        })
    }

    /// Index of the most recent validated ledger.
    pub async fn validated_ledger_index(&self) -> Result<u32, LedgerError> {
        let result = self
            .conn
            .request("ledger", json!({ "ledger_index": VALIDATED }))
            .await?;
        result
            .get("ledger_index")
            .and_then(as_u32)
            .ok_or_else(|| LedgerError::InvalidResponse("ledger: missing ledger_index".into()))
    }

    /// The network id reported by `server_info`, if any.
    pub async fn network_id(&self) -> Result<Option<u32>, LedgerError> {
        let result = self.conn.request("server_info", json!({})).await?;
        Ok(result.pointer("/info/network_id").and_then(as_u32))
    }

    pub async fn submit(&self, tx_blob: &str) -> Result<SubmitResult, LedgerError> {
        parse(self.conn.request("submit", json!({ "tx_blob": tx_blob })).await?)
    }

    pub async fn tx(&self, hash: &str) -> Result<TxLookup, LedgerError> {
        let result = match self.conn.request("tx", json!({ "transaction": hash })).await {
            Ok(result) => result,
            Err(e) if e.is_api_error("txnNotFound") => return Ok(TxLookup::NotFound),
            Err(e) => return Err(e.into()),
        };
        if result.get("validated").and_then(Value::as_bool) != Some(true) {
            return Ok(TxLookup::Pending);
        }
        let ledger_index = result
            .get("ledger_index")
            .and_then(as_u32)
            .ok_or_else(|| LedgerError::InvalidResponse("tx: missing ledger_index".into()))?;
        let result_code = result
            .pointer("/meta/TransactionResult")
            .and_then(Value::as_str)
            .ok_or_else(|| LedgerError::InvalidResponse("tx: missing TransactionResult".into()))?
            .to_string();
        Ok(TxLookup::Validated {
            ledger_index,
            result_code,
        })
    }
}

fn parse<T: DeserializeOwned>(value: Value) -> Result<T, LedgerError> {
    serde_json::from_value(value).map_err(|e| LedgerError::InvalidResponse(e.to_string()))
}

fn field<T: DeserializeOwned>(value: &Value, key: &str) -> Result<T, LedgerError> {
    let inner = value
        .get(key)
        .cloned()
        .ok_or_else(|| LedgerError::InvalidResponse(format!("missing {key}")))?;
    parse(inner)
}

fn drops_field(drops: &Value, key: &str) -> Result<u64, LedgerError> {
    drops
        .get(key)
        .and_then(|v| v.as_str().and_then(|s| s.parse().ok()).or_else(|| v.as_u64()))
        .ok_or_else(|| LedgerError::InvalidResponse(format!("fee: missing {key}")))
}

/// Ledger indexes arrive as numbers or numeric strings depending on the command.
fn as_u32(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
        .and_then(|n| u32::try_from(n).ok())
}
