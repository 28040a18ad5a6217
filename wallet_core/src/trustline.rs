//! Idempotent trustline setup.

use tracing::info;

use rlusd_ledger::{autofill, submit_and_wait, AccountStatusResolver, AutofillConfig, SubmitConfig, ValidatedTx};
use rlusd_network::Connection;
use rlusd_transactions::TxIntent;
use rlusd_types::{Address, CurrencyCode, TokenAmount, TrustlineStatus};

use crate::error::{AccountStateError, WalletError};
use crate::wallet::Wallet;

/// What [`TrustlineManager::ensure_trustline`] found or did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrustlineOutcome {
    /// A matching line was already in place; nothing was submitted.
    Existing(TrustlineStatus),
    /// A `TrustSet` was validated with `tesSUCCESS`.
    Created {
        validated: ValidatedTx,
        limit: TokenAmount,
    },
}

impl TrustlineOutcome {
    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }
}

#[derive(Clone, Debug, Default)]
pub struct TrustlineManager {
    pub autofill: AutofillConfig,
    pub submit: SubmitConfig,
}

impl TrustlineManager {
    pub fn new(autofill: AutofillConfig, submit: SubmitConfig) -> Self {
        Self { autofill, submit }
    }

    /// Make sure `wallet` trusts `issuer` for `currency`.
    ///
    /// An existing line is returned unchanged, whatever its limit.
    pub async fn ensure_trustline(
        &self,
        conn: &Connection,
        wallet: &Wallet,
        issuer: &Address,
        currency: &CurrencyCode,
        limit: TokenAmount,
    ) -> Result<TrustlineOutcome, WalletError> {
        let resolver = AccountStatusResolver::new(conn);
        let report = resolver
            .resolve(wallet.address(), Some((issuer, currency)))
            .await?;
        if !report.account.exists {
            return Err(AccountStateError::SenderMissing(wallet.address().to_string()).into());
        }
        let line = report.trustline_or_absent();
        if line.has_trustline {
            info!(address = %wallet.address(), %currency, limit = %line.limit, "trustline already exists");
            return Ok(TrustlineOutcome::Existing(line));
        }

        info!(address = %wallet.address(), %issuer, %currency, %limit, "creating trustline");
        let intent = TxIntent::trust_set(*currency, issuer.clone(), limit);
        let prepared = autofill(conn, wallet.address(), intent, &self.autofill).await?;
        let signed = wallet.sign(&prepared)?;
        let validated =
            submit_and_wait(conn, &signed, prepared.last_ledger_sequence, &self.submit).await?;
        info!(hash = %validated.hash, "trustline created");
        Ok(TrustlineOutcome::Created { validated, limit })
    }
}
