//! Operational constants shared by the CLI, the HTTP server and the wallet
//! workflows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Issuer account of RLUSD on mainnet.
pub const DEFAULT_ISSUER: &str = "rMxCKbEDwqr76QuheSUMdEGf4B9xJ8m5De";

/// Ticker used when no currency is configured.
pub const DEFAULT_CURRENCY: &str = "RLUSD";

/// Trust limit applied when a caller does not supply one.
pub const DEFAULT_TRUST_LIMIT: &str = "1000000";

/// Ledgers a submitted transaction stays valid for.
pub const LEDGER_OFFSET: u32 = 20;

/// Largest amount a library-level payment may move.
pub const LIBRARY_AMOUNT_CEILING: i64 = 1_000_000_000;

/// Largest amount a single HTTP payment request may move.
pub const HTTP_AMOUNT_CEILING: i64 = 1_000;

/// Capacity of the in-memory transaction history.
pub const LOG_CAPACITY: usize = 100;

/// XRP amounts an account needs before it can hold a trustline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XrpRequirements {
    /// Reserve every account must keep.
    pub base_reserve: Decimal,
    /// Extra reserve per owned ledger object, a trustline included.
    pub owner_reserve: Decimal,
    /// Smallest deposit that activates an account with room for one trustline.
    pub minimum_funding: Decimal,
    /// Funding that also covers fees for routine use.
    pub safe_operational: Decimal,
}

impl Default for XrpRequirements {
    fn default() -> Self {
        Self {
            base_reserve: Decimal::from(10),
            owner_reserve: Decimal::from(2),
            minimum_funding: Decimal::from(15),
            safe_operational: Decimal::from(25),
        }
    }
}

impl XrpRequirements {
    /// Reserve locked once the account holds `objects` ledger objects.
    pub fn reserve_for(&self, objects: u32) -> Decimal {
        self.base_reserve + self.owner_reserve * Decimal::from(objects)
    }
}
