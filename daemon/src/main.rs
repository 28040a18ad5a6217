//! rlusd: desk CLI and HTTP server.

mod commands;
mod config;

use clap::Parser;
use std::path::PathBuf;

use rlusd_types::Network;
use rlusd_utils::init_logging;

use crate::commands::Command;
use crate::config::DeskConfig;

#[derive(Parser)]
#[command(name = "rlusd", about = "XRP Ledger desk for RLUSD wallets, trustlines and payments")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// flags and env vars override them.
    #[arg(long, global = true, env = "RLUSD_CONFIG")]
    config: Option<PathBuf>,

    /// Network: "mainnet", "testnet" or "devnet".
    #[arg(long, global = true, env = "RLUSD_NETWORK")]
    network: Option<Network>,

    /// Use testnet regardless of the configured network.
    #[arg(long, global = true, env = "RLUSD_TEST_MODE")]
    test_mode: bool,

    /// Server URIs in fallback order (comma-separated).
    #[arg(long, global = true, env = "RLUSD_ENDPOINTS", value_delimiter = ',')]
    endpoints: Vec<String>,

    /// Token issuer address.
    #[arg(long, global = true, env = "ISSUER")]
    issuer: Option<String>,

    /// Currency code, e.g. "RLUSD" or "USD".
    #[arg(long, global = true, env = "CURRENCY")]
    currency: Option<String>,

    /// Currency as 40 hex characters; overrides --currency.
    #[arg(long, global = true, env = "CURRENCY_HEX")]
    currency_hex: Option<String>,

    #[arg(long, global = true, env = "RLUSD_LOGS_DIR")]
    logs_dir: Option<PathBuf>,

    #[arg(long, global = true, env = "RLUSD_WALLETS_DIR")]
    wallets_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "RLUSD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "RLUSD_LOG_FORMAT")]
    log_format: Option<String>,

    /// Per-request timeout towards ledger servers, in seconds.
    #[arg(long, global = true, env = "RLUSD_REQUEST_TIMEOUT")]
    request_timeout_secs: Option<u64>,

    /// Delay between validation polls after a submit, in milliseconds.
    #[arg(long, global = true, env = "RLUSD_POLL_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    /// Layer flag and env overrides on top of `base`.
    fn apply(&self, base: DeskConfig) -> DeskConfig {
        DeskConfig {
            network: self.network.unwrap_or(base.network),
            test_mode: self.test_mode || base.test_mode,
            endpoints: if self.endpoints.is_empty() {
                base.endpoints
            } else {
                self.endpoints.clone()
            },
            issuer: self.issuer.clone().unwrap_or(base.issuer),
            currency: self.currency.clone().unwrap_or(base.currency),
            currency_hex: self.currency_hex.clone().or(base.currency_hex),
            logs_dir: self.logs_dir.clone().unwrap_or(base.logs_dir),
            wallets_dir: self.wallets_dir.clone().unwrap_or(base.wallets_dir),
            log_level: self.log_level.clone().unwrap_or(base.log_level),
            log_format: self.log_format.clone().unwrap_or(base.log_format),
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(base.request_timeout_secs),
            poll_interval_ms: self.poll_interval_ms.unwrap_or(base.poll_interval_ms),
            ..base
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => DeskConfig::from_toml_file(path)?,
        None => DeskConfig::default(),
    };
    let config = cli.apply(base);

    init_logging(config.log_format()?, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }
    config.validate()?;

    commands::run(cli.command, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values() {
        let cli = Cli::parse_from([
            "rlusd",
            "--issuer",
            "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh",
            "--endpoints",
            "wss://a.example,wss://b.example",
            "balance",
            "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh",
        ]);
        let base = DeskConfig {
            currency: "USD".into(),
            port: 4000,
            ..DeskConfig::default()
        };
        let merged = cli.apply(base);
        assert_eq!(merged.issuer, "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh");
        assert_eq!(merged.endpoints.len(), 2);
        assert_eq!(merged.currency, "USD");
        assert_eq!(merged.port, 4000);
    }

    #[test]
    fn global_flags_accepted_after_subcommand() {
        let cli = Cli::parse_from(["rlusd", "serve", "--port", "3100", "--network", "testnet"]);
        assert_eq!(cli.network, Some(Network::Testnet));
        assert!(matches!(cli.command, Command::Serve { port: Some(3100), .. }));
    }

    #[test]
    fn unknown_network_rejected() {
        assert!(Cli::try_parse_from(["rlusd", "--network", "moon", "serve"]).is_err());
    }
}
