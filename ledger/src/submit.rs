//! Submission and waiting for a final outcome.

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use rlusd_network::Connection;
use rlusd_transactions::SignedTx;

use crate::client::{LedgerClient, TxLookup};
use crate::error::LedgerError;

/// The ledger's success result code.
pub const SUCCESS_CODE: &str = "tesSUCCESS";

/// Preliminary result classes that can never reach a validated ledger.
const TERMINAL_PRELIMINARY: [&str; 3] = ["tem", "tef", "tel"];

#[derive(Clone, Debug)]
pub struct SubmitConfig {
    /// Delay between `tx` lookups.
    pub poll_interval: Duration,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// A transaction validated with `tesSUCCESS`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedTx {
    pub hash: String,
    pub ledger_index: u32,
    pub result_code: String,
}

/// Submit `signed` and block until it is validated or can no longer be.
///
/// Any result other than `tesSUCCESS` is returned as
/// [`LedgerError::Rejected`] carrying the raw code. There is no retry.
pub async fn submit_and_wait(
    conn: &Connection,
    signed: &SignedTx,
    last_ledger_sequence: u32,
    config: &SubmitConfig,
) -> Result<ValidatedTx, LedgerError> {
    let client = LedgerClient::new(conn);
    let hash = signed.hash.to_hex();
    let preliminary = client.submit(&signed.tx_blob).await?;
    info!(
        %hash,
        engine_result = %preliminary.engine_result,
        "transaction submitted"
    );
    if TERMINAL_PRELIMINARY
        .iter()
        .any(|prefix| preliminary.engine_result.starts_with(prefix))
    {
        warn!(%hash, code = %preliminary.engine_result, message = %preliminary.engine_result_message, "transaction rejected");
        return Err(LedgerError::Rejected {
            code: preliminary.engine_result,
            hash,
        });
    }

    loop {
        // Read before the lookup: a tx absent after this index was seen can
        // no longer land in a ledger at or below it.
        let validated = client.validated_ledger_index().await?;
        match client.tx(&hash).await? {
            TxLookup::Validated {
                ledger_index,
                result_code,
            } => {
                if result_code == SUCCESS_CODE {
                    info!(%hash, ledger_index, "transaction validated");
                    return Ok(ValidatedTx {
                        hash,
                        ledger_index,
                        result_code,
                    });
                }
                warn!(%hash, code = %result_code, "transaction failed");
                return Err(LedgerError::Rejected {
                    code: result_code,
                    hash,
                });
            }
            TxLookup::Pending | TxLookup::NotFound => {
                if validated > last_ledger_sequence {
                    warn!(%hash, validated, last_ledger_sequence, "transaction expired");
                    return Err(LedgerError::Expired {
                        hash,
                        last_ledger_sequence,
                    });
                }
                debug!(%hash, validated, "waiting for validation");
            }
        }
        tokio::time::sleep(config.poll_interval).await;
    }
}
