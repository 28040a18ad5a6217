//! Waiting for an account to be activated with XRP.

use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

use rlusd_network::Connection;
use rlusd_types::{parse_decimal, AccountStatus, Address, Decimal, XrpRequirements};

use crate::error::LedgerError;
use crate::resolver::AccountStatusResolver;

/// Polling policy for [`wait_for_funding`].
#[derive(Clone, Debug)]
pub struct FundingWait {
    pub interval: Duration,
    /// `None` waits until the process is stopped.
    pub timeout: Option<Duration>,
    pub minimum_xrp: Decimal,
}

impl Default for FundingWait {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: None,
            minimum_xrp: XrpRequirements::default().minimum_funding,
        }
    }
}

/// Poll until `address` exists with at least `wait.minimum_xrp`.
pub async fn wait_for_funding(
    conn: &Connection,
    address: &Address,
    wait: &FundingWait,
) -> Result<AccountStatus, LedgerError> {
    let resolver = AccountStatusResolver::new(conn);
    let started = Instant::now();
    let mut attempt = 0u64;
    loop {
        attempt += 1;
        let status = resolver.account(address).await?;
        if status.exists && parse_decimal(&status.balance)? >= wait.minimum_xrp {
            info!(%address, balance = %status.balance, attempt, "account funded");
            return Ok(status);
        }
        info!(
            %address,
            balance = %status.balance,
            required = %wait.minimum_xrp,
            attempt,
            "waiting for funding"
        );
        if let Some(limit) = wait.timeout {
            if started.elapsed() + wait.interval > limit {
                return Err(LedgerError::FundingTimeout {
                    address: address.to_string(),
                    waited_secs: started.elapsed().as_secs(),
                });
            }
        }
        tokio::time::sleep(wait.interval).await;
    }
}
