//! A transaction with every field needed for signing.

use serde_json::{json, Map, Value};
use rlusd_types::Address;

use crate::amount::LedgerAmount;
use crate::intent::TxIntent;

/// An intent plus the fields autofill supplies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedTx {
    pub account: Address,
    pub intent: TxIntent,
    pub flags: u32,
    pub sequence: u32,
    pub fee_drops: u64,
    pub last_ledger_sequence: u32,
    /// Only set on networks whose id is above 1024.
    pub network_id: Option<u32>,
}

impl PreparedTx {
    /// The `tx_json` form, for logs and display.
    pub fn to_json(&self) -> Value {
        let mut tx = Map::new();
        tx.insert("TransactionType".into(), json!(self.intent.kind().as_str()));
        tx.insert("Account".into(), json!(self.account.as_str()));
        match &self.intent {
            TxIntent::TrustSet(t) => {
                let limit = LedgerAmount::issued(&t.limit, t.currency, &t.issuer);
                tx.insert("LimitAmount".into(), limit.to_json());
            }
            TxIntent::Payment(p) => {
                let amount = LedgerAmount::issued(&p.amount, p.currency, &p.issuer);
                tx.insert("Destination".into(), json!(p.destination.as_str()));
                tx.insert("Amount".into(), amount.to_json());
                if let Some(tag) = p.destination_tag {
                    tx.insert("DestinationTag".into(), json!(tag));
                }
            }
        }
        tx.insert("Flags".into(), json!(self.flags));
        tx.insert("Sequence".into(), json!(self.sequence));
        tx.insert("Fee".into(), json!(self.fee_drops.to_string()));
        tx.insert("LastLedgerSequence".into(), json!(self.last_ledger_sequence));
        if let Some(id) = self.network_id {
            tx.insert("NetworkID".into(), json!(id));
        }
        Value::Object(tx)
    }
}
