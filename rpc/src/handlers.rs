//! Route handlers and their request and response bodies.
//!
//! Every handler takes one profile snapshot up front. Handlers that talk to
//! the ledger open a connection, run their queries, and close it before
//! turning the outcome into a response.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use rlusd_ledger::AccountStatusResolver;
use rlusd_store::{to_csv, LogQuery, RecordKind, TransactionRecord, DEFAULT_QUERY_LIMIT};
use rlusd_types::{Address, CurrencyCode, TokenAmount, XrpRequirements};
use rlusd_wallet_core::{
    confirm_balances, parse_destination_tag, PaymentRequest, PaymentSubmitter, TrustlineManager,
    TrustlineOutcome, Wallet,
};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::{AppState, Profile};

type Shared = State<Arc<AppState>>;

fn required(field: Option<String>, message: &str) -> Result<String, ApiError> {
    field
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}

// ── Config ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    pub issuer: String,
    pub currency_code: String,
    pub currency_hex: String,
    pub has_wallet: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    pub network: String,
    pub endpoints: Vec<String>,
}

fn config_view(state: &AppState, profile: &Profile) -> ConfigView {
    ConfigView {
        issuer: profile.issuer.to_string(),
        currency_code: profile.currency.display_name(),
        currency_hex: profile.currency.to_hex(),
        has_wallet: profile.wallet.is_some(),
        wallet_address: profile.wallet.as_ref().map(|w| w.address().to_string()),
        network: state.settings.network.as_str().to_string(),
        endpoints: state.endpoints.iter().map(|u| u.to_string()).collect(),
    }
}

pub async fn get_config(State(state): Shared) -> Json<ConfigView> {
    let profile = state.profile();
    Json(config_view(&state, &profile))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    pub issuer: Option<String>,
    pub currency_code: Option<String>,
    pub currency_hex: Option<String>,
    pub wallet_seed: Option<String>,
}

/// A supplied, non-blank field. Blank strings leave the setting unchanged.
fn supplied(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Validate every supplied field, then merge them into the live profile.
pub async fn update_config(
    State(state): Shared,
    ApiJson(update): ApiJson<ConfigUpdate>,
) -> Result<Json<Value>, ApiError> {
    let issuer = supplied(&update.issuer)
        .map(|raw| {
            Address::parse(raw).map_err(|_| ApiError::BadRequest("Invalid issuer address".into()))
        })
        .transpose()?;
    let from_code = supplied(&update.currency_code)
        .map(CurrencyCode::parse)
        .transpose()?;
    let from_hex = supplied(&update.currency_hex)
        .map(|raw| {
            CurrencyCode::from_hex(raw).map_err(|_| {
                ApiError::BadRequest("Invalid currency hex (must be 40 hex characters)".into())
            })
        })
        .transpose()?;
    let currency = match (from_code, from_hex) {
        (Some(code), Some(hex)) if code != hex => {
            return Err(ApiError::BadRequest(
                "currencyCode and currencyHex denote different currencies".into(),
            ))
        }
        (Some(code), _) | (None, Some(code)) => Some(code),
        (None, None) => None,
    };

    let wallet = match supplied(&update.wallet_seed) {
        Some(seed) => {
            let wallet = Wallet::from_seed(seed)?;
            let mut conn = state.connect().await?;
            let status = AccountStatusResolver::new(&conn)
                .account(wallet.address())
                .await;
            conn.close().await;
            if !status?.exists {
                return Err(ApiError::BadRequest(format!(
                    "Wallet not activated. Send at least {} XRP to {} to activate.",
                    XrpRequirements::default().base_reserve,
                    wallet.address()
                )));
            }
            Some(Arc::new(wallet))
        }
        None => None,
    };

    let next = state.update_profile(|current| Profile {
        issuer: issuer.clone().unwrap_or_else(|| current.issuer.clone()),
        currency: currency.unwrap_or(current.currency),
        wallet: wallet.clone().or_else(|| current.wallet.clone()),
    });
    info!(
        issuer = %next.issuer,
        currency = %next.currency,
        has_wallet = next.wallet.is_some(),
        "configuration updated"
    );

    let changes = json!({
        "changes": {
            "issuer": issuer.as_ref().map(|a| a.to_string()),
            "currencyCode": supplied(&update.currency_code),
            "currencyHex": supplied(&update.currency_hex),
            "hasWallet": wallet.is_some(),
        }
    });
    state
        .record(RecordKind::ConfigUpdate, &next, changes, true)
        .await;

    Ok(Json(json!({
        "success": true,
        "config": config_view(&state, &next),
    })))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TestConnectionRequest {
    pub wallet_seed: Option<String>,
}

/// Check a seed and the ledger connection without changing anything.
pub async fn test_connection(
    State(state): Shared,
    ApiJson(body): ApiJson<TestConnectionRequest>,
) -> Result<Json<Value>, ApiError> {
    let seed = required(body.wallet_seed, "Wallet seed required")?;
    let wallet = Wallet::from_seed(&seed)?;
    let profile = state.profile();

    let mut conn = state.connect().await?;
    let report = AccountStatusResolver::new(&conn)
        .resolve(wallet.address(), Some((&profile.issuer, &profile.currency)))
        .await;
    conn.close().await;
    let report = report?;
    let line = report.trustline_or_absent();

    Ok(Json(json!({
        "success": true,
        "address": wallet.address(),
        "exists": report.account.exists,
        "xrpBalance": report.account.balance,
        "balance": line.balance,
        "hasTrustline": line.has_trustline,
    })))
}

// ── Status ───────────────────────────────────────────────────────────────

pub async fn health(State(state): Shared) -> Json<Value> {
    let profile = state.profile();
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "hasWallet": profile.wallet.is_some(),
        "config": {
            "issuer": profile.issuer,
            "currency": profile.currency.display_name(),
        },
    }))
}

/// Account and trustline status of one address, as returned by the API.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressStatus {
    pub address: String,
    pub exists: bool,
    pub xrp_balance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
    pub has_trustline: bool,
    pub balance: String,
    pub limit: String,
    pub currency: String,
    pub issuer: String,
}

async fn address_status(
    state: &AppState,
    profile: &Profile,
    address: &Address,
) -> Result<AddressStatus, ApiError> {
    let mut conn = state.connect().await?;
    let report = AccountStatusResolver::new(&conn)
        .resolve(address, Some((&profile.issuer, &profile.currency)))
        .await;
    conn.close().await;
    let report = report?;
    let line = report.trustline_or_absent();
    Ok(AddressStatus {
        address: address.to_string(),
        exists: report.account.exists,
        xrp_balance: report.account.balance,
        sequence: report.account.sequence,
        has_trustline: line.has_trustline,
        balance: line.balance,
        limit: line.limit,
        currency: profile.currency.display_name(),
        issuer: profile.issuer.to_string(),
    })
}

pub async fn wallet_status(State(state): Shared) -> Result<Json<AddressStatus>, ApiError> {
    let profile = state.profile();
    let wallet = profile.wallet()?;
    Ok(Json(address_status(&state, &profile, wallet.address()).await?))
}

#[derive(Deserialize, Default)]
pub struct AddressRequest {
    pub address: Option<String>,
}

pub async fn balance(
    State(state): Shared,
    ApiJson(body): ApiJson<AddressRequest>,
) -> Result<Json<AddressStatus>, ApiError> {
    let profile = state.profile();
    let raw = body.address.unwrap_or_default();
    let address =
        Address::parse(raw.trim()).map_err(|_| ApiError::BadRequest("Invalid address".into()))?;

    match address_status(&state, &profile, &address).await {
        Ok(status) => {
            state
                .record(
                    RecordKind::BalanceCheck,
                    &profile,
                    json!({ "address": status.address, "balance": status.balance }),
                    true,
                )
                .await;
            Ok(Json(status))
        }
        Err(e) => {
            state
                .record(
                    RecordKind::BalanceCheck,
                    &profile,
                    json!({ "address": address, "error": e.to_string() }),
                    false,
                )
                .await;
            Err(e)
        }
    }
}

// ── Transactions ─────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct TrustlineRequest {
    pub limit: Option<String>,
}

pub async fn create_trustline(
    State(state): Shared,
    ApiJson(body): ApiJson<TrustlineRequest>,
) -> Result<Json<Value>, ApiError> {
    let profile = state.profile();
    let wallet = profile.wallet()?.clone();
    let limit = match body.limit.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => TokenAmount::parse(raw)?,
        _ => state.settings.default_trust_limit,
    };
    let manager = TrustlineManager::new(state.settings.autofill.clone(), state.settings.submit.clone());

    let _guard = state.submit_lock.lock().await;
    let mut conn = state.connect().await?;
    let outcome = manager
        .ensure_trustline(&conn, &wallet, &profile.issuer, &profile.currency, limit)
        .await;
    conn.close().await;

    let currency = profile.currency.display_name();
    match outcome {
        Ok(TrustlineOutcome::Existing(line)) => {
            state
                .record(
                    RecordKind::CreateTrustline,
                    &profile,
                    json!({
                        "address": wallet.address(),
                        "currency": currency,
                        "issuer": profile.issuer,
                        "limit": line.limit,
                        "existing": true,
                    }),
                    true,
                )
                .await;
            Ok(Json(json!({
                "success": true,
                "existing": true,
                "limit": line.limit,
                "balance": line.balance,
                "currency": currency,
                "issuer": profile.issuer,
            })))
        }
        Ok(TrustlineOutcome::Created { validated, limit }) => {
            state
                .record(
                    RecordKind::CreateTrustline,
                    &profile,
                    json!({
                        "address": wallet.address(),
                        "currency": currency,
                        "issuer": profile.issuer,
                        "limit": limit,
                        "hash": validated.hash,
                        "ledger": validated.ledger_index,
                    }),
                    true,
                )
                .await;
            Ok(Json(json!({
                "success": true,
                "existing": false,
                "hash": validated.hash,
                "ledger": validated.ledger_index,
                "limit": limit,
                "currency": currency,
                "issuer": profile.issuer,
                "explorerUrl": state.settings.network.transaction_url(&validated.hash),
            })))
        }
        Err(e) => {
            let error = ApiError::from(e);
            warn!(error = %error, "trustline setup failed");
            state
                .record(
                    RecordKind::CreateTrustline,
                    &profile,
                    json!({ "error": error.to_string(), "limit": limit, "currency": currency }),
                    false,
                )
                .await;
            Err(error)
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub destination: Option<String>,
    pub amount: Option<Value>,
    pub destination_tag: Option<Value>,
}

/// Numbers and strings are both accepted for amounts and tags.
fn text_field(value: Option<Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    }
}

pub async fn send(
    State(state): Shared,
    ApiJson(body): ApiJson<SendRequest>,
) -> Result<Json<Value>, ApiError> {
    let profile = state.profile();
    let wallet = profile.wallet()?.clone();
    let destination = body.destination.unwrap_or_default();
    let amount = text_field(body.amount).unwrap_or_default();
    let tag = text_field(body.destination_tag);

    Address::parse(destination.trim())
        .map_err(|_| ApiError::BadRequest("Invalid destination address".into()))?;
    TokenAmount::parse_with_ceiling(&amount, state.settings.payment_ceiling)?;
    parse_destination_tag(tag.as_deref())?;

    let request = PaymentRequest {
        destination: destination.clone(),
        amount: amount.clone(),
        currency: profile.currency,
        issuer: profile.issuer.clone(),
        destination_tag: tag,
    };
    let submitter = PaymentSubmitter {
        ceiling: state.settings.payment_ceiling,
        autofill: state.settings.autofill.clone(),
        submit: state.settings.submit.clone(),
    };

    let _guard = state.submit_lock.lock().await;
    let mut conn = state.connect().await?;
    let sent = submitter.send(&conn, &wallet, &request).await;
    let balances = match &sent {
        Ok(receipt) => confirm_balances(&conn, receipt).await.ok(),
        Err(_) => None,
    };
    conn.close().await;

    let currency = profile.currency.display_name();
    match sent {
        Ok(receipt) => {
            let log = state
                .record(
                    RecordKind::SendPayment,
                    &profile,
                    json!({
                        "from": receipt.from,
                        "to": receipt.to,
                        "amount": receipt.amount,
                        "currency": currency,
                        "issuer": receipt.issuer,
                        "destinationTag": receipt.destination_tag,
                        "hash": receipt.validated.hash,
                        "ledger": receipt.validated.ledger_index,
                        "fee": receipt.fee_drops.to_string(),
                        "result": receipt.validated.result_code,
                    }),
                    true,
                )
                .await;
            Ok(Json(json!({
                "success": true,
                "hash": receipt.validated.hash,
                "ledger": receipt.validated.ledger_index,
                "explorerUrl": state.settings.network.transaction_url(&receipt.validated.hash),
                "balances": balances,
                "log": log,
            })))
        }
        Err(e) => {
            let error = ApiError::from(e);
            warn!(error = %error, "payment failed");
            state
                .record(
                    RecordKind::SendPayment,
                    &profile,
                    json!({
                        "from": wallet.address(),
                        "to": destination,
                        "amount": amount,
                        "currency": currency,
                        "error": error.to_string(),
                    }),
                    false,
                )
                .await;
            Err(error)
        }
    }
}

// ── Logs ─────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct LogsParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub date: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct LogsResponse {
    pub logs: Vec<TransactionRecord>,
    pub total: usize,
}

pub async fn logs(
    State(state): Shared,
    ApiQuery(params): ApiQuery<LogsParams>,
) -> Json<LogsResponse> {
    let logs = state.log.query(&LogQuery {
        kind: params.kind.filter(|k| !k.is_empty()),
        date: params.date.filter(|d| !d.is_empty()),
        limit: params.limit.unwrap_or(DEFAULT_QUERY_LIMIT),
    });
    let total = logs.len();
    Json(LogsResponse { logs, total })
}

pub async fn export_logs(State(state): Shared) -> Result<impl IntoResponse, ApiError> {
    let csv = to_csv(&state.log.snapshot()).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=xrpl-transactions.csv",
            ),
        ],
        csv,
    ))
}

// ── Validation ───────────────────────────────────────────────────────────

pub async fn validate_address(
    ApiJson(body): ApiJson<AddressRequest>,
) -> Result<Json<Value>, ApiError> {
    let address = required(body.address, "Address required")?;
    let is_valid = Address::is_valid(&address);
    Ok(Json(json!({
        "address": address,
        "isValid": is_valid,
        "message": if is_valid { "Valid XRP Ledger address" } else { "Invalid address format" },
    })))
}
