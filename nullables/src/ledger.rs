//! Nullable ledger server.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use url::Url;

use rlusd_network::{Connector, EndpointSet, NetworkError, Transport};
use rlusd_transactions::{decode, transaction_hash, DecodedTx, LedgerAmount, TxKind};
use rlusd_types::{AccountId, Address, CurrencyCode, DROPS_PER_XRP};

/// Host of the endpoint returned by [`NullLedger::endpoints`].
pub const NULL_HOST: &str = "null.ledger.test";

const BASE_RESERVE_DROPS: u64 = 10 * DROPS_PER_XRP;
const OWNER_RESERVE_DROPS: u64 = 2 * DROPS_PER_XRP;

#[derive(Clone, Debug)]
struct NullAccount {
    balance_drops: u64,
    sequence: u32,
    owner_count: u32,
}

/// A trustline held by `holder` towards `issuer`, balance from the holder's side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NullTrustline {
    pub holder: AccountId,
    pub issuer: AccountId,
    pub currency: CurrencyCode,
    pub balance: Decimal,
    pub limit: Decimal,
}

struct StoredTx {
    result: String,
    ledger_index: u32,
    pending_polls: u32,
}

struct State {
    accounts: HashMap<AccountId, NullAccount>,
    lines: Vec<NullTrustline>,
    ledger_index: u32,
    ledger_advance: u32,
    network_id: Option<u32>,
    base_fee: u64,
    open_ledger_fee: u64,
    unreachable: HashSet<String>,
    connect_attempts: Vec<String>,
    requests: Vec<(String, Value)>,
    submissions: Vec<DecodedTx>,
    next_results: VecDeque<String>,
    preliminary: Option<String>,
    validation_delay: u32,
    lose_submissions: bool,
    txs: HashMap<String, StoredTx>,
    closes: usize,
}

impl Default for State {
    fn default() -> Self {
        Self {
            accounts: HashMap::new(),
            lines: Vec::new(),
            ledger_index: 1_000,
            ledger_advance: 0,
            network_id: None,
            base_fee: 10,
            open_ledger_fee: 10,
            unreachable: HashSet::new(),
            connect_attempts: Vec::new(),
            requests: Vec::new(),
            submissions: Vec::new(),
            next_results: VecDeque::new(),
            preliminary: None,
            validation_delay: 0,
            lose_submissions: false,
            txs: HashMap::new(),
            closes: 0,
        }
    }
}

/// An in-memory ledger that answers like a rippled server.
///
/// Clones share state, so a test can keep one handle for assertions while
/// the code under test connects through another.
#[derive(Clone, Default)]
pub struct NullLedger {
    state: Arc<Mutex<State>>,
}

impl NullLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        lock(&self.state)
    }

    /// A single-endpoint set pointing at this ledger.
    pub fn endpoints() -> EndpointSet {
        Self::endpoints_named(&[NULL_HOST])
    }

    /// An endpoint set with one `wss://<host>` entry per host, in order.
    pub fn endpoints_named(hosts: &[&str]) -> EndpointSet {
        EndpointSet::new(hosts.iter().map(|h| format!("wss://{h}")))
            .unwrap_or_else(|_| EndpointSet::default())
    }

    /// Make connection attempts to `host` fail.
    pub fn set_unreachable(&self, host: &str) {
        self.state().unreachable.insert(host.to_string());
    }

    /// Create or top up an account with `xrp` whole XRP.
    pub fn fund(&self, address: &Address, xrp: u64) {
        self.fund_drops(address, xrp * DROPS_PER_XRP);
    }

    pub fn fund_drops(&self, address: &Address, drops: u64) {
        let mut state = self.state();
        let account = state
            .accounts
            .entry(*address.account_id())
            .or_insert(NullAccount {
                balance_drops: 0,
                sequence: 1,
                owner_count: 0,
            });
        account.balance_drops += drops;
    }

    /// Install a trustline directly, bypassing TrustSet.
    pub fn add_trustline(
        &self,
        holder: &Address,
        issuer: &Address,
        currency: CurrencyCode,
        balance: &str,
        limit: &str,
    ) {
        let mut state = self.state();
        if let Some(account) = state.accounts.get_mut(holder.account_id()) {
            account.owner_count += 1;
        }
        state.lines.push(NullTrustline {
            holder: *holder.account_id(),
            issuer: *issuer.account_id(),
            currency,
            balance: balance.parse().unwrap_or_default(),
            limit: limit.parse().unwrap_or_default(),
        });
    }

    pub fn trustline(
        &self,
        holder: &Address,
        issuer: &Address,
        currency: CurrencyCode,
    ) -> Option<NullTrustline> {
        self.state()
            .lines
            .iter()
            .find(|l| {
                l.holder == *holder.account_id()
                    && l.issuer == *issuer.account_id()
                    && l.currency == currency
            })
            .cloned()
    }

    pub fn balance_drops(&self, address: &Address) -> Option<u64> {
        self.state()
            .accounts
            .get(address.account_id())
            .map(|a| a.balance_drops)
    }

    pub fn sequence(&self, address: &Address) -> Option<u32> {
        self.state().accounts.get(address.account_id()).map(|a| a.sequence)
    }

    pub fn set_network_id(&self, id: Option<u32>) {
        self.state().network_id = id;
    }

    pub fn set_fees(&self, base_fee: u64, open_ledger_fee: u64) {
        let mut state = self.state();
        state.base_fee = base_fee;
        state.open_ledger_fee = open_ledger_fee;
    }

    /// Force the validated result of the next submission.
    pub fn push_result(&self, code: &str) {
        self.state().next_results.push_back(code.to_string());
    }

    /// Force the preliminary result of the next submission; nothing is applied.
    pub fn set_preliminary(&self, code: &str) {
        self.state().preliminary = Some(code.to_string());
    }

    /// Report submitted transactions as not yet validated for `polls` lookups.
    pub fn set_validation_delay(&self, polls: u32) {
        self.state().validation_delay = polls;
    }

    /// Accept submissions but never include them in a ledger.
    pub fn lose_submissions(&self) {
        self.state().lose_submissions = true;
    }

    /// Advance the validated ledger by `n` on every `ledger` query.
    pub fn set_ledger_advance(&self, n: u32) {
        self.state().ledger_advance = n;
    }

    pub fn ledger_index(&self) -> u32 {
        self.state().ledger_index
    }

    pub fn submissions(&self) -> Vec<DecodedTx> {
        self.state().submissions.clone()
    }

    pub fn submission_count(&self) -> usize {
        self.state().submissions.len()
    }

    /// Commands received, in order.
    pub fn requests(&self) -> Vec<String> {
        self.state().requests.iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn request_count(&self, command: &str) -> usize {
        self.state().requests.iter().filter(|(c, _)| c == command).count()
    }

    pub fn last_params(&self, command: &str) -> Option<Value> {
        self.state()
            .requests
            .iter()
            .rev()
            .find(|(c, _)| c == command)
            .map(|(_, p)| p.clone())
    }

    /// Endpoints a connection was attempted to, in order.
    pub fn connect_attempts(&self) -> Vec<String> {
        self.state().connect_attempts.clone()
    }

    pub fn close_count(&self) -> usize {
        self.state().closes
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Connector for NullLedger {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn Transport>, NetworkError> {
        let mut state = self.state();
        state.connect_attempts.push(endpoint.to_string());
        let host = endpoint.host_str().unwrap_or_default();
        if state.unreachable.contains(host) {
            return Err(NetworkError::ConnectionFailed {
                endpoint: endpoint.to_string(),
                reason: "connection refused".into(),
            });
        }
        Ok(Box::new(NullTransport {
            endpoint: endpoint.to_string(),
            state: self.state.clone(),
        }))
    }
}

struct NullTransport {
    endpoint: String,
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl Transport for NullTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, command: &str, params: Value) -> Result<Value, NetworkError> {
        let mut state = lock(&self.state);
        state.requests.push((command.to_string(), params.clone()));
        match command {
            "account_info" => account_info(&state, &params),
            "account_lines" => account_lines(&state, &params),
            "fee" => Ok(json!({
                "drops": {
                    "base_fee": state.base_fee.to_string(),
                    "median_fee": "5000",
                    "minimum_fee": state.base_fee.to_string(),
                    "open_ledger_fee": state.open_ledger_fee.to_string(),
                },
                "ledger_current_index": state.ledger_index + 1,
            })),
            "ledger" => {
                state.ledger_index += state.ledger_advance;
                Ok(json!({
                    "ledger_index": state.ledger_index,
                    "validated": true,
                    "ledger": { "ledger_index": state.ledger_index.to_string(), "closed": true },
                }))
            }
            "server_info" => {
                let mut info = json!({
                    "build_version": "2.3.0",
                    "server_state": "full",
                    "validated_ledger": { "seq": state.ledger_index, "base_fee_xrp": 0.00001 },
                });
                if let Some(id) = state.network_id {
                    info["network_id"] = json!(id);
                }
                Ok(json!({ "info": info }))
            }
            "submit" => submit(&mut state, &params),
            "tx" => tx(&mut state, &params),
            _ => Err(api("unknownCmd", 32, "Unknown method.")),
        }
    }

    async fn close(&self) -> Result<(), NetworkError> {
        lock(&self.state).closes += 1;
        Ok(())
    }
}

fn api(error: &str, code: i64, message: &str) -> NetworkError {
    NetworkError::Api {
        error: error.to_string(),
        code: Some(code),
        message: Some(message.to_string()),
    }
}

fn account_param(params: &Value, key: &str) -> Result<Address, NetworkError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .and_then(|raw| Address::parse(raw).ok())
        .ok_or_else(|| api("actMalformed", 35, "Account malformed."))
}

fn decimal_text(value: Decimal) -> String {
    value.normalize().to_string()
}

fn account_info(state: &State, params: &Value) -> Result<Value, NetworkError> {
    let address = account_param(params, "account")?;
    let account = state
        .accounts
        .get(address.account_id())
        .ok_or_else(|| api("actNotFound", 19, "Account not found."))?;
    Ok(json!({
        "account_data": {
            "Account": address.as_str(),
            "Balance": account.balance_drops.to_string(),
            "Flags": 0,
            "OwnerCount": account.owner_count,
            "Sequence": account.sequence,
        },
        "ledger_index": state.ledger_index,
        "validated": true,
    }))
}

fn account_lines(state: &State, params: &Value) -> Result<Value, NetworkError> {
    let address = account_param(params, "account")?;
    if !state.accounts.contains_key(address.account_id()) {
        return Err(api("actNotFound", 19, "Account not found."));
    }
    let peer = match params.get("peer") {
        Some(_) => Some(*account_param(params, "peer")?.account_id()),
        None => None,
    };
    let me = *address.account_id();
    let mut lines = Vec::new();
    for line in &state.lines {
        if line.holder == me && peer.map_or(true, |p| p == line.issuer) {
            lines.push(json!({
                "account": Address::from_account_id(line.issuer).as_str(),
                "balance": decimal_text(line.balance),
                "currency": line.currency.ledger_code(),
                "limit": decimal_text(line.limit),
                "limit_peer": "0",
                "quality_in": 0,
                "quality_out": 0,
            }));
        } else if line.issuer == me && peer.map_or(true, |p| p == line.holder) {
            lines.push(json!({
                "account": Address::from_account_id(line.holder).as_str(),
                "balance": decimal_text(-line.balance),
                "currency": line.currency.ledger_code(),
                "limit": "0",
                "limit_peer": decimal_text(line.limit),
                "quality_in": 0,
                "quality_out": 0,
            }));
        }
    }
    Ok(json!({
        "account": address.as_str(),
        "lines": lines,
        "ledger_index": state.ledger_index,
        "validated": true,
    }))
}

fn submit(state: &mut State, params: &Value) -> Result<Value, NetworkError> {
    let blob_hex = params
        .get("tx_blob")
        .and_then(Value::as_str)
        .ok_or_else(|| api("invalidParams", 31, "Missing field 'tx_blob'."))?;
    let blob =
        hex::decode(blob_hex).map_err(|_| api("invalidParams", 31, "Invalid field 'tx_blob'."))?;
    let decoded =
        decode(&blob).map_err(|e| api("invalidTransaction", 31, &e.to_string()))?;
    let hash = transaction_hash(&blob).to_hex();
    state.submissions.push(decoded.clone());

    let result = match state.preliminary.take() {
        Some(code) => code,
        None => apply(state, &decoded),
    };
    let included = result.starts_with("tes") || result.starts_with("tec");
    if included && !state.lose_submissions {
        state.ledger_index += 1;
        let stored = StoredTx {
            result: result.clone(),
            ledger_index: state.ledger_index,
            pending_polls: state.validation_delay,
        };
        state.txs.insert(hash.clone(), stored);
    }
    Ok(json!({
        "accepted": included,
        "applied": included,
        "engine_result": result,
        "engine_result_code": if result == "tesSUCCESS" { 0 } else { 100 },
        "engine_result_message": format!("{result} (null ledger)"),
        "tx_blob": blob_hex,
        "tx_json": { "hash": hash },
    }))
}

fn tx(state: &mut State, params: &Value) -> Result<Value, NetworkError> {
    let hash = params
        .get("transaction")
        .and_then(Value::as_str)
        .map(str::to_ascii_uppercase)
        .ok_or_else(|| api("invalidParams", 31, "Missing field 'transaction'."))?;
    let stored = state
        .txs
        .get_mut(&hash)
        .ok_or_else(|| api("txnNotFound", 29, "Transaction not found."))?;
    if stored.pending_polls > 0 {
        stored.pending_polls -= 1;
        return Ok(json!({ "hash": hash, "validated": false }));
    }
    Ok(json!({
        "hash": hash,
        "ledger_index": stored.ledger_index,
        "validated": true,
        "meta": { "TransactionResult": stored.result },
    }))
}

/// Apply `tx` to state, returning its result code.
fn apply(state: &mut State, tx: &DecodedTx) -> String {
    let Some(sender) = tx.account else {
        return "temMALFORMED".into();
    };
    let Some(account) = state.accounts.get(&sender).cloned() else {
        return "terNO_ACCOUNT".into();
    };
    match tx.sequence {
        Some(seq) if seq < account.sequence => return "tefPAST_SEQ".into(),
        Some(seq) if seq > account.sequence => return "terPRE_SEQ".into(),
        None => return "temMALFORMED".into(),
        _ => {}
    }

    let forced = state.next_results.pop_front();
    let result = match forced {
        Some(code) => code,
        None => match tx.kind {
            Some(TxKind::TrustSet) => apply_trust_set(state, sender, &account, tx),
            Some(TxKind::Payment) => apply_payment(state, sender, tx),
            None => "temMALFORMED".into(),
        },
    };

    if result.starts_with("tes") || result.starts_with("tec") {
        if let Some(acct) = state.accounts.get_mut(&sender) {
            acct.sequence += 1;
            acct.balance_drops = acct.balance_drops.saturating_sub(tx.fee_drops().unwrap_or(0));
        }
    }
    result
}

fn apply_trust_set(
    state: &mut State,
    sender: AccountId,
    account: &NullAccount,
    tx: &DecodedTx,
) -> String {
    let Some(LedgerAmount::Issued {
        value,
        currency,
        issuer,
    }) = tx.limit_amount.clone()
    else {
        return "temBAD_LIMIT".into();
    };
    if !state.accounts.contains_key(&issuer) {
        return "tecNO_ISSUER".into();
    }
    if let Some(line) = state
        .lines
        .iter_mut()
        .find(|l| l.holder == sender && l.issuer == issuer && l.currency == currency)
    {
        line.limit = value;
        return "tesSUCCESS".into();
    }
    let reserve = BASE_RESERVE_DROPS + OWNER_RESERVE_DROPS * u64::from(account.owner_count + 1);
    if account.balance_drops < reserve {
        return "tecNO_LINE_INSUF_RESERVE".into();
    }
    state.lines.push(NullTrustline {
        holder: sender,
        issuer,
        currency,
        balance: Decimal::ZERO,
        limit: value,
    });
    if let Some(acct) = state.accounts.get_mut(&sender) {
        acct.owner_count += 1;
    }
    "tesSUCCESS".into()
}

fn apply_payment(state: &mut State, sender: AccountId, tx: &DecodedTx) -> String {
    let Some(destination) = tx.destination else {
        return "temDST_NEEDED".into();
    };
    if !state.accounts.contains_key(&destination) {
        return "tecNO_DST".into();
    }
    let (value, currency, issuer) = match tx.amount.clone() {
        Some(LedgerAmount::Issued {
            value,
            currency,
            issuer,
        }) => (value, currency, issuer),
        Some(LedgerAmount::Xrp(drops)) => return move_xrp(state, sender, destination, drops),
        None => return "temBAD_AMOUNT".into(),
    };
    let find = |lines: &[NullTrustline], holder: AccountId| {
        lines
            .iter()
            .position(|l| l.holder == holder && l.issuer == issuer && l.currency == currency)
    };

    let debit = if sender == issuer {
        None
    } else {
        match find(&state.lines, sender) {
            Some(i) if state.lines[i].balance >= value => Some(i),
            Some(_) => return "tecPATH_PARTIAL".into(),
            None => return "tecPATH_DRY".into(),
        }
    };
    let credit = if destination == issuer {
        None
    } else {
        match find(&state.lines, destination) {
            Some(i) if state.lines[i].balance + value <= state.lines[i].limit => Some(i),
            Some(_) => return "tecPATH_PARTIAL".into(),
            None => return "tecPATH_DRY".into(),
        }
    };
    if let Some(i) = debit {
        state.lines[i].balance -= value;
    }
    if let Some(i) = credit {
        state.lines[i].balance += value;
    }
    "tesSUCCESS".into()
}

fn move_xrp(state: &mut State, sender: AccountId, destination: AccountId, drops: u64) -> String {
    let available = state.accounts.get(&sender).map_or(0, |a| a.balance_drops);
    if available < drops + BASE_RESERVE_DROPS {
        return "tecUNFUNDED_PAYMENT".into();
    }
    if let Some(a) = state.accounts.get_mut(&sender) {
        a.balance_drops -= drops;
    }
    if let Some(a) = state.accounts.get_mut(&destination) {
        a.balance_drops += drops;
    }
    "tesSUCCESS".into()
}
