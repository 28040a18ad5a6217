//! Account and trustline status at the validated ledger.

use rlusd_network::Connection;
use rlusd_types::{drops_to_xrp, AccountReport, AccountStatus, Address, CurrencyCode, TrustlineStatus};

use crate::client::LedgerClient;
use crate::error::LedgerError;

/// Resolves account existence, XRP balance and one trustline.
///
/// A missing account is a normal answer, not an error.
pub struct AccountStatusResolver<'a> {
    client: LedgerClient<'a>,
}

impl<'a> AccountStatusResolver<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            client: LedgerClient::new(conn),
        }
    }

    pub async fn account(&self, address: &Address) -> Result<AccountStatus, LedgerError> {
        match self.client.account_info(address).await? {
            Some(info) => Ok(AccountStatus {
                exists: true,
                balance: drops_to_xrp(&info.balance_drops)?,
                sequence: Some(info.sequence),
            }),
            None => Ok(AccountStatus::missing()),
        }
    }

    /// The line between `address` and `issuer` for `currency`, or the absent status.
    pub async fn trustline(
        &self,
        address: &Address,
        issuer: &Address,
        currency: &CurrencyCode,
    ) -> Result<TrustlineStatus, LedgerError> {
        let lines = match self.client.account_lines(address, issuer).await {
            Ok(lines) => lines,
            Err(LedgerError::Network(e)) if e.is_api_error("actNotFound") => {
                return Ok(TrustlineStatus::absent())
            }
            Err(e) => return Err(e),
        };
        Ok(lines
            .into_iter()
            .find(|line| currency.matches(&line.currency))
            .map(|line| TrustlineStatus {
                has_trustline: true,
                balance: line.balance,
                limit: line.limit,
            })
            .unwrap_or_else(TrustlineStatus::absent))
    }

    /// Account status plus, when `trust` is given, the matching trustline.
    ///
    /// For a missing account the trustline is reported absent without a
    /// second query.
    pub async fn resolve(
        &self,
        address: &Address,
        trust: Option<(&Address, &CurrencyCode)>,
    ) -> Result<AccountReport, LedgerError> {
        let account = self.account(address).await?;
        let trustline = match trust {
            None => None,
            Some(_) if !account.exists => Some(TrustlineStatus::absent()),
            Some((issuer, currency)) => Some(self.trustline(address, issuer, currency).await?),
        };
        Ok(AccountReport { account, trustline })
    }
}
