//! Shared server state.
//!
//! The active profile is an immutable snapshot behind an `Arc`. Handlers
//! read it once at the start and keep using that snapshot. A configuration
//! update merges its fields into the live profile under the write lock, so
//! concurrent updates to different fields never overwrite each other.

use serde_json::{Map, Value};
use std::sync::{Arc, RwLock};

use rlusd_ledger::{AutofillConfig, SubmitConfig};
use rlusd_network::{open, Connection, Connector, EndpointSet};
use rlusd_store::{RecordConfig, RecordKind, TransactionLog, TransactionRecord};
use rlusd_types::params::{DEFAULT_TRUST_LIMIT, HTTP_AMOUNT_CEILING};
use rlusd_types::{Address, CurrencyCode, Decimal, Network, TokenAmount, ValidationError};
use rlusd_wallet_core::Wallet;

use crate::error::ApiError;

/// Issuer, currency and optional signing wallet the server acts with.
#[derive(Clone, Debug)]
pub struct Profile {
    pub issuer: Address,
    pub currency: CurrencyCode,
    pub wallet: Option<Arc<Wallet>>,
}

impl Profile {
    pub fn record_config(&self) -> RecordConfig {
        RecordConfig::new(&self.issuer, &self.currency)
    }

    pub fn wallet(&self) -> Result<&Arc<Wallet>, ApiError> {
        self.wallet.as_ref().ok_or_else(ApiError::no_wallet)
    }
}

/// Knobs that do not change while the server runs.
#[derive(Clone, Debug)]
pub struct ServerSettings {
    pub network: Network,
    pub default_trust_limit: TokenAmount,
    pub payment_ceiling: Decimal,
    pub autofill: AutofillConfig,
    pub submit: SubmitConfig,
}

impl ServerSettings {
    pub fn new(network: Network) -> Result<Self, ValidationError> {
        Ok(Self {
            network,
            default_trust_limit: TokenAmount::parse(DEFAULT_TRUST_LIMIT)?,
            payment_ceiling: Decimal::from(HTTP_AMOUNT_CEILING),
            autofill: AutofillConfig::default(),
            submit: SubmitConfig::default(),
        })
    }
}

pub struct AppState {
    profile: RwLock<Arc<Profile>>,
    /// Serializes transactions signed by the profile wallet.
    pub submit_lock: tokio::sync::Mutex<()>,
    pub log: TransactionLog,
    pub connector: Arc<dyn Connector>,
    pub endpoints: EndpointSet,
    pub settings: ServerSettings,
}

impl AppState {
    pub fn new(
        profile: Profile,
        log: TransactionLog,
        connector: Arc<dyn Connector>,
        endpoints: EndpointSet,
        settings: ServerSettings,
    ) -> Arc<Self> {
        Arc::new(Self {
            profile: RwLock::new(Arc::new(profile)),
            submit_lock: tokio::sync::Mutex::new(()),
            log,
            connector,
            endpoints,
            settings,
        })
    }

    /// The current profile snapshot.
    pub fn profile(&self) -> Arc<Profile> {
        match self.profile.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Build the next profile from the live one and install it, atomically.
    pub fn update_profile(&self, merge: impl FnOnce(&Profile) -> Profile) -> Arc<Profile> {
        let mut guard = match self.profile.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let next = Arc::new(merge(&guard));
        *guard = next.clone();
        next
    }

    pub async fn connect(&self) -> Result<Connection, ApiError> {
        Ok(open(&self.endpoints, self.connector.as_ref()).await?)
    }

    pub async fn record(
        &self,
        kind: RecordKind,
        profile: &Profile,
        details: Value,
        success: bool,
    ) -> TransactionRecord {
        let details = match details {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.log
            .record(kind, profile.record_config(), details, success)
            .await
    }
}
