//! Desk configuration with TOML file support.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use rlusd_network::EndpointSet;
use rlusd_types::params::{DEFAULT_CURRENCY, DEFAULT_ISSUER};
use rlusd_types::{Address, CurrencyCode, Network};
use rlusd_utils::LogFormat;

/// Settings shared by every `rlusd` command.
///
/// Loaded from a TOML file via [`DeskConfig::from_toml_file`], then
/// overridden field by field from flags and environment variables. The
/// wallet seed is never read from the file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeskConfig {
    #[serde(default)]
    pub network: Network,

    /// Shorthand for `network = "testnet"`.
    #[serde(default)]
    pub test_mode: bool,

    /// Server URIs in fallback order. Empty means the network's public set.
    #[serde(default)]
    pub endpoints: Vec<String>,

    #[serde(default = "default_issuer")]
    pub issuer: String,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// 40-character hex form; wins over `currency` when set.
    #[serde(default)]
    pub currency_hex: Option<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,

    #[serde(default = "default_wallets_dir")]
    pub wallets_dir: PathBuf,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Delay between validation polls after a submit.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_issuer() -> String {
    DEFAULT_ISSUER.to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_wallets_dir() -> PathBuf {
    PathBuf::from("wallets")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DeskConfig {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn effective_network(&self) -> Network {
        if self.test_mode {
            Network::Testnet
        } else {
            self.network
        }
    }

    pub fn endpoint_set(&self) -> anyhow::Result<EndpointSet> {
        if self.endpoints.is_empty() {
            return Ok(EndpointSet::for_network(self.effective_network()));
        }
        Ok(EndpointSet::new(&self.endpoints)?)
    }

    pub fn issuer_address(&self) -> anyhow::Result<Address> {
        Address::parse(self.issuer.trim()).with_context(|| "invalid issuer in configuration")
    }

    pub fn currency_code(&self) -> anyhow::Result<CurrencyCode> {
        match self.currency_hex.as_deref().map(str::trim) {
            Some(hex) if !hex.is_empty() => Ok(CurrencyCode::from_hex(hex)?),
            _ => Ok(CurrencyCode::parse(self.currency.trim())?),
        }
    }

    pub fn log_format(&self) -> anyhow::Result<LogFormat> {
        Ok(self.log_format.parse()?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Reject settings no command could work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.endpoint_set()?;
        self.issuer_address()?;
        self.currency_code()?;
        self.log_format()?;
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be positive");
        }
        Ok(())
    }
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            test_mode: false,
            endpoints: Vec::new(),
            issuer: default_issuer(),
            currency: default_currency(),
            currency_hex: None,
            port: default_port(),
            logs_dir: default_logs_dir(),
            wallets_dir: default_wallets_dir(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}
