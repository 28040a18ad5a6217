//! Filling in sequence, fee, expiry and network id.

use tracing::debug;

use rlusd_network::Connection;
use rlusd_transactions::{PreparedTx, TxIntent};
use rlusd_types::params::LEDGER_OFFSET;
use rlusd_types::Address;

use crate::client::LedgerClient;
use crate::error::LedgerError;

/// Networks with an id at or below this value must omit `NetworkID`.
const LEGACY_NETWORK_ID_MAX: u32 = 1024;

#[derive(Clone, Debug)]
pub struct AutofillConfig {
    /// Ledgers after the current validated one that the transaction stays valid.
    pub ledger_offset: u32,
    /// Upper bound on the fee, in drops.
    pub max_fee_drops: u64,
}

impl Default for AutofillConfig {
    fn default() -> Self {
        Self {
            ledger_offset: LEDGER_OFFSET,
            max_fee_drops: 2_000_000,
        }
    }
}

/// Turn an intent from `account` into a transaction ready to sign.
pub async fn autofill(
    conn: &Connection,
    account: &Address,
    intent: TxIntent,
    config: &AutofillConfig,
) -> Result<PreparedTx, LedgerError> {
    let client = LedgerClient::new(conn);
    let info = client
        .account_info(account)
        .await?
        .ok_or_else(|| LedgerError::AccountNotFound(account.to_string()))?;
    let fee = client.fee().await?;
    let validated = client.validated_ledger_index().await?;
    let network_id = client
        .network_id()
        .await?
        .filter(|id| *id > LEGACY_NETWORK_ID_MAX);

    let prepared = PreparedTx {
        account: account.clone(),
        intent,
        flags: 0,
        sequence: info.sequence,
        fee_drops: cushioned_fee(fee.base_fee.max(fee.open_ledger_fee), config.max_fee_drops),
        last_ledger_sequence: validated + config.ledger_offset,
        network_id,
    };
    debug!(tx = %prepared.to_json(), "transaction prepared");
    Ok(prepared)
}

/// Add 20% headroom, rounded up, and cap.
fn cushioned_fee(drops: u64, max: u64) -> u64 {
    (drops.saturating_mul(12).div_ceil(10)).min(max)
}
