//! Guarded token payments.
//!
//! Every local and ledger-state precondition is checked before anything is
//! signed, so a failed precondition never reaches the ledger.

use serde::Serialize;
use tracing::info;

use rlusd_ledger::{autofill, submit_and_wait, AccountStatusResolver, AutofillConfig, SubmitConfig, ValidatedTx};
use rlusd_network::Connection;
use rlusd_transactions::TxIntent;
use rlusd_types::params::LIBRARY_AMOUNT_CEILING;
use rlusd_types::{parse_decimal, Address, CurrencyCode, Decimal, TokenAmount, TrustlineStatus, ValidationError};

use crate::error::{AccountStateError, WalletError};
use crate::wallet::Wallet;

/// A payment as typed by a user: nothing here is validated yet.
#[derive(Clone, Debug)]
pub struct PaymentRequest {
    pub destination: String,
    pub amount: String,
    pub currency: CurrencyCode,
    pub issuer: Address,
    pub destination_tag: Option<String>,
}

/// A validated, successful payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    #[serde(flatten)]
    pub validated: ValidatedTx,
    pub from: Address,
    pub to: Address,
    pub amount: TokenAmount,
    pub currency: CurrencyCode,
    pub issuer: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_tag: Option<u32>,
    pub fee_drops: u64,
}

/// Trustline balances of both parties, read after a payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceConfirmation {
    pub sender: TrustlineStatus,
    pub destination: TrustlineStatus,
}

/// Parse an optional destination tag; empty text means no tag.
pub fn parse_destination_tag(raw: Option<&str>) -> Result<Option<u32>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse::<u32>()
            .map(Some)
            .map_err(|_| ValidationError::InvalidTag(text.to_string())),
    }
}

#[derive(Clone, Debug)]
pub struct PaymentSubmitter {
    /// Largest amount accepted, inclusive.
    pub ceiling: Decimal,
    pub autofill: AutofillConfig,
    pub submit: SubmitConfig,
}

impl Default for PaymentSubmitter {
    fn default() -> Self {
        Self::with_ceiling(Decimal::from(LIBRARY_AMOUNT_CEILING))
    }
}

impl PaymentSubmitter {
    pub fn with_ceiling(ceiling: Decimal) -> Self {
        Self {
            ceiling,
            autofill: AutofillConfig::default(),
            submit: SubmitConfig::default(),
        }
    }

    /// Check, sign and submit `request` from `wallet`, then wait for validation.
    pub async fn send(
        &self,
        conn: &Connection,
        wallet: &Wallet,
        request: &PaymentRequest,
    ) -> Result<PaymentReceipt, WalletError> {
        let sender = wallet.address().clone();
        let destination = Address::parse(request.destination.trim())?;
        let amount = TokenAmount::parse_with_ceiling(&request.amount, self.ceiling)?;
        let destination_tag = parse_destination_tag(request.destination_tag.as_deref())?;
        let currency = request.currency;
        let issuer = &request.issuer;

        let resolver = AccountStatusResolver::new(conn);
        let from = resolver.resolve(&sender, Some((issuer, &currency))).await?;
        if !from.account.exists {
            return Err(AccountStateError::SenderMissing(sender.to_string()).into());
        }
        let from_line = from.trustline_or_absent();
        if !from_line.has_trustline {
            return Err(AccountStateError::SenderNoTrustline {
                address: sender.to_string(),
                currency: currency.display_name(),
            }
            .into());
        }
        if parse_decimal(&from_line.balance)? < amount.value() {
            return Err(AccountStateError::InsufficientBalance {
                currency: currency.display_name(),
                available: from_line.balance,
                requested: amount.to_string(),
            }
            .into());
        }

        let to = resolver
            .resolve(&destination, Some((issuer, &currency)))
            .await?;
        if !to.account.exists {
            return Err(AccountStateError::DestinationMissing(destination.to_string()).into());
        }
        if !to.trustline_or_absent().has_trustline {
            return Err(AccountStateError::DestinationNoTrustline {
                address: destination.to_string(),
                currency: currency.display_name(),
            }
            .into());
        }

        info!(from = %sender, to = %destination, %amount, %currency, "sending payment");
        let intent = TxIntent::payment(
            currency,
            issuer.clone(),
            destination.clone(),
            amount,
            destination_tag,
        );
        let prepared = autofill(conn, &sender, intent, &self.autofill).await?;
        let signed = wallet.sign(&prepared)?;
        let validated =
            submit_and_wait(conn, &signed, prepared.last_ledger_sequence, &self.submit).await?;
        info!(hash = %validated.hash, ledger = validated.ledger_index, "payment validated");

        Ok(PaymentReceipt {
            validated,
            from: sender,
            to: destination,
            amount,
            currency,
            issuer: issuer.clone(),
            destination_tag,
            fee_drops: prepared.fee_drops,
        })
    }
}

/// Re-read both trustline balances after a payment; informational only.
pub async fn confirm_balances(
    conn: &Connection,
    receipt: &PaymentReceipt,
) -> Result<BalanceConfirmation, WalletError> {
    let resolver = AccountStatusResolver::new(conn);
    let sender = resolver
        .trustline(&receipt.from, &receipt.issuer, &receipt.currency)
        .await?;
    let destination = resolver
        .trustline(&receipt.to, &receipt.issuer, &receipt.currency)
        .await?;
    Ok(BalanceConfirmation {
        sender,
        destination,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlusd_network::open;
    use rlusd_nullables::NullLedger;
    use rlusd_types::Seed;
    use std::time::Duration;

    const ISSUER: &str = "rMxCKbEDwqr76QuheSUMdEGf4B9xJ8m5De";

    struct Desk {
        ledger: NullLedger,
        sender: Wallet,
        receiver: Wallet,
        issuer: Address,
        currency: CurrencyCode,
    }

    fn desk(sender_balance: &str) -> Desk {
        let ledger = NullLedger::new();
        let sender = Wallet::from_seed_bytes(Seed([5u8; 16]));
        let receiver = Wallet::from_seed_bytes(Seed([6u8; 16]));
        let issuer = Address::parse(ISSUER).unwrap();
        let currency = CurrencyCode::parse("RLUSD").unwrap();
        for addr in [sender.address(), receiver.address(), &issuer] {
            ledger.fund(addr, 30);
        }
        ledger.add_trustline(sender.address(), &issuer, currency, sender_balance, "1000000");
        Desk {
            ledger,
            sender,
            receiver,
            issuer,
            currency,
        }
    }

    fn submitter() -> PaymentSubmitter {
        let mut s = PaymentSubmitter::default();
        s.submit.poll_interval = Duration::from_millis(1);
        s
    }

    fn request(d: &Desk, destination: &str, amount: &str) -> PaymentRequest {
        PaymentRequest {
            destination: destination.to_string(),
            amount: amount.to_string(),
            currency: d.currency,
            issuer: d.issuer.clone(),
            destination_tag: None,
        }
    }

    #[tokio::test]
    async fn invalid_amounts_never_submit() {
        let d = desk("50");
        d.ledger
            .add_trustline(d.receiver.address(), &d.issuer, d.currency, "0", "1000000");
        let conn = open(&NullLedger::endpoints(), &d.ledger).await.unwrap();
        let to = d.receiver.address().to_string();
        for amount in ["0", "-5", "abc", "1000000001"] {
            let err = submitter()
                .send(&conn, &d.sender, &request(&d, &to, amount))
                .await
                .unwrap_err();
            assert!(matches!(err, WalletError::Validation(_)), "{amount}: {err}");
        }
        assert_eq!(d.ledger.submission_count(), 0);
        assert_eq!(d.ledger.request_count("account_info"), 0);
    }

    #[tokio::test]
    async fn http_ceiling_is_inclusive() {
        let d = desk("5000");
        d.ledger
            .add_trustline(d.receiver.address(), &d.issuer, d.currency, "0", "1000000");
        let conn = open(&NullLedger::endpoints(), &d.ledger).await.unwrap();
        let capped = PaymentSubmitter {
            ceiling: Decimal::from(1000),
            ..submitter()
        };
        let to = d.receiver.address().to_string();
        let err = capped
            .send(&conn, &d.sender, &request(&d, &to, "1000.5"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WalletError::Validation(ValidationError::AmountAboveCeiling { .. })
        ));
        assert!(capped.send(&conn, &d.sender, &request(&d, &to, "1000")).await.is_ok());
    }

    #[tokio::test]
    async fn malformed_destination_is_validation_error() {
        let d = desk("50");
        let conn = open(&NullLedger::endpoints(), &d.ledger).await.unwrap();
        let err = submitter()
            .send(&conn, &d.sender, &request(&d, "rInvalid", "10"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WalletError::Validation(ValidationError::InvalidAddress(_))
        ));
        assert_eq!(d.ledger.submission_count(), 0);
    }

    #[tokio::test]
    async fn insufficient_balance_cites_available() {
        let d = desk("5");
        d.ledger
            .add_trustline(d.receiver.address(), &d.issuer, d.currency, "0", "1000000");
        let conn = open(&NullLedger::endpoints(), &d.ledger).await.unwrap();
        let to = d.receiver.address().to_string();
        let err = submitter()
            .send(&conn, &d.sender, &request(&d, &to, "10"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Available: 5"), "{err}");
        match err {
            WalletError::AccountState(AccountStateError::InsufficientBalance {
                available, ..
            }) => assert_eq!(available, "5"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(d.ledger.submission_count(), 0);
    }

    #[tokio::test]
    async fn destination_without_trustline_is_rejected_locally() {
        let d = desk("50");
        let conn = open(&NullLedger::endpoints(), &d.ledger).await.unwrap();
        let to = d.receiver.address().to_string();
        let err = submitter()
            .send(&conn, &d.sender, &request(&d, &to, "10"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WalletError::AccountState(AccountStateError::DestinationNoTrustline { .. })
        ));
        assert_eq!(d.ledger.submission_count(), 0);
    }

    #[tokio::test]
    async fn unfunded_destination_is_missing() {
        let d = desk("50");
        let conn = open(&NullLedger::endpoints(), &d.ledger).await.unwrap();
        let stranger = Wallet::from_seed_bytes(Seed([9u8; 16]));
        let err = submitter()
            .send(&conn, &d.sender, &request(&d, stranger.address().as_str(), "1"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WalletError::AccountState(AccountStateError::DestinationMissing(_))
        ));
    }

    #[tokio::test]
    async fn sender_without_trustline_is_rejected() {
        let d = desk("50");
        let conn = open(&NullLedger::endpoints(), &d.ledger).await.unwrap();
        let to = d.sender.address().to_string();
        let err = submitter()
            .send(&conn, &d.receiver, &request(&d, &to, "1"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WalletError::AccountState(AccountStateError::SenderNoTrustline { .. })
        ));
    }

    #[tokio::test]
    async fn successful_payment_moves_balances() {
        let d = desk("50");
        d.ledger
            .add_trustline(d.receiver.address(), &d.issuer, d.currency, "0", "1000000");
        let conn = open(&NullLedger::endpoints(), &d.ledger).await.unwrap();
        let to = d.receiver.address().to_string();
        let mut req = request(&d, &to, "12.5");
        req.destination_tag = Some("42".into());

        let receipt = submitter().send(&conn, &d.sender, &req).await.unwrap();
        assert_eq!(receipt.validated.result_code, "tesSUCCESS");
        assert_eq!(receipt.destination_tag, Some(42));
        assert_eq!(d.ledger.submissions()[0].destination_tag, Some(42));

        let balances = confirm_balances(&conn, &receipt).await.unwrap();
        assert_eq!(balances.sender.balance, "37.5");
        assert_eq!(balances.destination.balance, "12.5");
    }

    #[tokio::test]
    async fn ledger_failure_surfaces_result_code() {
        let d = desk("50");
        d.ledger
            .add_trustline(d.receiver.address(), &d.issuer, d.currency, "0", "1000000");
        d.ledger.push_result("tecPATH_DRY");
        let conn = open(&NullLedger::endpoints(), &d.ledger).await.unwrap();
        let to = d.receiver.address().to_string();
        let err = submitter()
            .send(&conn, &d.sender, &request(&d, &to, "1"))
            .await
            .unwrap_err();
        assert_eq!(err.result_code(), Some("tecPATH_DRY"));
        assert_eq!(d.ledger.submission_count(), 1);
    }

    #[test]
    fn tags_must_be_u32() {
        assert_eq!(parse_destination_tag(None), Ok(None));
        assert_eq!(parse_destination_tag(Some("")), Ok(None));
        assert_eq!(parse_destination_tag(Some("4294967295")), Ok(Some(u32::MAX)));
        assert!(parse_destination_tag(Some("12abc")).is_err());
        assert!(parse_destination_tag(Some("-1")).is_err());
    }
}
