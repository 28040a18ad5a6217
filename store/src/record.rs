//! Transaction log entries.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use rlusd_types::{Address, CurrencyCode};

/// What a record describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    ConfigUpdate,
    BalanceCheck,
    CreateTrustline,
    SendPayment,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigUpdate => "config_update",
            Self::BalanceCheck => "balance_check",
            Self::CreateTrustline => "create_trustline",
            Self::SendPayment => "send_payment",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "config_update" => Ok(Self::ConfigUpdate),
            "balance_check" => Ok(Self::BalanceCheck),
            "create_trustline" => Ok(Self::CreateTrustline),
            "send_payment" => Ok(Self::SendPayment),
            other => Err(format!("unknown record type: {other}")),
        }
    }
}

/// Issuer and currency active when the record was written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordConfig {
    pub issuer: String,
    pub currency: String,
}

impl RecordConfig {
    pub fn new(issuer: &Address, currency: &CurrencyCode) -> Self {
        Self {
            issuer: issuer.to_string(),
            currency: currency.display_name(),
        }
    }
}

/// One immutable log entry.
///
/// Operation-specific fields (`from`, `to`, `amount`, `hash`, `error`, ...)
/// live in `details` and are flattened into the JSON object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub success: bool,
    pub config: RecordConfig,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl TransactionRecord {
    /// `YYYY-MM-DD` of the record's UTC timestamp.
    pub fn day(&self) -> String {
        self.timestamp.format("%Y-%m-%d").to_string()
    }

    /// RFC 3339 timestamp with millisecond precision.
    pub fn timestamp_text(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// A detail rendered as text; strings unquoted, absent as empty.
    pub fn detail(&self, key: &str) -> String {
        match self.details.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn details_flatten_into_record_object() {
        let mut details = Map::new();
        details.insert("hash".into(), json!("ABC"));
        details.insert("ledger".into(), json!(42));
        let record = TransactionRecord {
            id: "1".into(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            kind: RecordKind::CreateTrustline,
            success: true,
            config: RecordConfig {
                issuer: "rIssuer".into(),
                currency: "RLUSD".into(),
            },
            details,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "create_trustline");
        assert_eq!(value["hash"], "ABC");
        assert_eq!(value["config"]["currency"], "RLUSD");

        let back: TransactionRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.day(), "2024-03-01");
        assert_eq!(back.detail("ledger"), "42");
        assert_eq!(back.detail("missing"), "");
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in [
            RecordKind::ConfigUpdate,
            RecordKind::BalanceCheck,
            RecordKind::CreateTrustline,
            RecordKind::SendPayment,
        ] {
            assert_eq!(kind.as_str().parse::<RecordKind>(), Ok(kind));
        }
        assert!("mint".parse::<RecordKind>().is_err());
    }
}
