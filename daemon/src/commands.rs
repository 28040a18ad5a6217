//! Subcommand implementations.

use anyhow::{bail, Context};
use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use rlusd_ledger::{wait_for_funding, AccountStatusResolver, FundingWait, SubmitConfig};
use rlusd_network::{open, Connection, Connector, EndpointSet, XrplConnector};
use rlusd_rpc::{AppState, Profile, RpcServer, ServerSettings};
use rlusd_store::{TransactionLog, RECENT_DAYS};
use rlusd_types::params::DEFAULT_TRUST_LIMIT;
use rlusd_types::{
    parse_decimal, AccountReport, Address, CurrencyCode, Network, TokenAmount, XrpRequirements,
};
use rlusd_wallet_core::{
    confirm_balances, decrypt_keystore, load_keystore, save_wallet, ExportFormat, PaymentRequest,
    PaymentSubmitter, TrustlineManager, TrustlineOutcome, Wallet,
};

use crate::config::DeskConfig;

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    Serve {
        #[arg(long, env = "PORT")]
        port: Option<u16>,

        /// Signing wallet for trustline and send requests.
        #[arg(long, env = "XRPL_SEED", hide_env_values = true)]
        seed: Option<String>,
    },

    /// Generate, inspect and prepare wallets.
    Wallet {
        #[command(subcommand)]
        action: WalletAction,
    },

    /// Show XRP and token balances of an address.
    Balance { address: String },

    /// Send tokens from a wallet and wait for validation.
    Send {
        #[arg(long)]
        to: String,

        #[arg(long)]
        amount: String,

        #[arg(long)]
        tag: Option<String>,

        #[command(flatten)]
        signer: SignerArgs,
    },
}

#[derive(Subcommand)]
pub enum WalletAction {
    /// Generate a new wallet and write it to the wallets directory.
    Create {
        /// Write the seed and private key in clear text instead of a keystore.
        #[arg(long, value_enum)]
        plaintext: Option<PlaintextFormat>,

        /// Keystore password.
        #[arg(long, env = "RLUSD_WALLET_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Show activation and trustline status of an address.
    Check { address: String },

    /// Create the trustline for the configured issuer and currency.
    Setup {
        #[command(flatten)]
        signer: SignerArgs,

        /// Address the seed is expected to derive.
        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        limit: Option<String>,
    },

    /// Poll until an address holds enough XRP to be usable.
    WaitFunding {
        address: String,

        #[arg(long, default_value_t = 5)]
        interval_secs: u64,

        /// Give up after this many seconds; waits indefinitely when unset.
        #[arg(long)]
        timeout_secs: Option<u64>,

        #[arg(long)]
        minimum_xrp: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PlaintextFormat {
    Json,
    Txt,
}

/// Where the signing wallet comes from.
#[derive(Args)]
pub struct SignerArgs {
    #[arg(long, env = "XRPL_SEED", hide_env_values = true, conflicts_with = "keystore")]
    seed: Option<String>,

    /// Encrypted keystore written by `wallet create`.
    #[arg(long)]
    keystore: Option<PathBuf>,

    #[arg(long, env = "RLUSD_WALLET_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

impl SignerArgs {
    fn load(&self) -> anyhow::Result<Wallet> {
        if let Some(path) = &self.keystore {
            let password = self
                .password
                .as_deref()
                .context("--password or RLUSD_WALLET_PASSWORD is required to open a keystore")?;
            return Ok(decrypt_keystore(&load_keystore(path)?, password)?);
        }
        match &self.seed {
            Some(seed) => Ok(Wallet::from_seed(seed)?),
            None => bail!("no wallet given: pass --seed (or XRPL_SEED) or --keystore"),
        }
    }
}

/// Resolved settings plus the means to reach a ledger server.
struct Desk {
    network: Network,
    endpoints: EndpointSet,
    connector: Arc<dyn Connector>,
    issuer: Address,
    currency: CurrencyCode,
    poll_interval: Duration,
}

impl Desk {
    fn new(config: &DeskConfig) -> anyhow::Result<Self> {
        Ok(Self {
            network: config.effective_network(),
            endpoints: config.endpoint_set()?,
            connector: Arc::new(XrplConnector {
                request_timeout: config.request_timeout(),
            }),
            issuer: config.issuer_address()?,
            currency: config.currency_code()?,
            poll_interval: config.poll_interval(),
        })
    }

    async fn connect(&self) -> anyhow::Result<Connection> {
        Ok(open(&self.endpoints, self.connector.as_ref()).await?)
    }

    async fn report(&self, address: &Address) -> anyhow::Result<AccountReport> {
        let mut conn = self.connect().await?;
        let report = AccountStatusResolver::new(&conn)
            .resolve(address, Some((&self.issuer, &self.currency)))
            .await;
        conn.close().await;
        Ok(report?)
    }
}

pub async fn run(command: Command, config: DeskConfig) -> anyhow::Result<()> {
    let desk = Desk::new(&config)?;
    match command {
        Command::Serve { port, seed } => serve(&desk, &config, port, seed).await,
        Command::Wallet { action } => match action {
            WalletAction::Create {
                plaintext,
                password,
            } => create_wallet(&desk, &config, plaintext, password),
            WalletAction::Check { address } => check_wallet(&desk, &address).await,
            WalletAction::Setup {
                signer,
                address,
                limit,
            } => setup_wallet(&desk, &signer, address.as_deref(), limit.as_deref()).await,
            WalletAction::WaitFunding {
                address,
                interval_secs,
                timeout_secs,
                minimum_xrp,
            } => {
                let mut wait = FundingWait {
                    interval: Duration::from_secs(interval_secs.max(1)),
                    timeout: timeout_secs.map(Duration::from_secs),
                    ..FundingWait::default()
                };
                if let Some(raw) = minimum_xrp {
                    wait.minimum_xrp = parse_decimal(&raw)?;
                }
                wait_funding(&desk, &address, &wait).await
            }
        },
        Command::Balance { address } => balance(&desk, &address).await,
        Command::Send {
            to,
            amount,
            tag,
            signer,
        } => send(&desk, &signer, to, amount, tag).await,
    }
}

async fn serve(
    desk: &Desk,
    config: &DeskConfig,
    port: Option<u16>,
    seed: Option<String>,
) -> anyhow::Result<()> {
    let wallet = match seed.as_deref().map(str::trim) {
        Some(seed) if !seed.is_empty() => Some(Arc::new(Wallet::from_seed(seed)?)),
        _ => {
            warn!("no wallet seed configured; trustline and send requests will be refused");
            None
        }
    };

    let log = TransactionLog::new(&config.logs_dir);
    match log.load_recent(RECENT_DAYS).await {
        Ok(count) => info!(count, dir = %config.logs_dir.display(), "loaded transaction history"),
        Err(e) => warn!(error = %e, "could not load transaction history"),
    }

    let mut settings = ServerSettings::new(desk.network)?;
    settings.submit.poll_interval = desk.poll_interval;
    let profile = Profile {
        issuer: desk.issuer.clone(),
        currency: desk.currency,
        wallet,
    };
    let state = AppState::new(
        profile,
        log,
        desk.connector.clone(),
        desk.endpoints.clone(),
        settings,
    );
    RpcServer::new(port.unwrap_or(config.port), state)
        .start()
        .await?;
    Ok(())
}

fn create_wallet(
    desk: &Desk,
    config: &DeskConfig,
    plaintext: Option<PlaintextFormat>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let format = match plaintext {
        Some(PlaintextFormat::Json) => ExportFormat::PlaintextJson,
        Some(PlaintextFormat::Txt) => ExportFormat::PlaintextText,
        None => ExportFormat::Encrypted {
            password: password.filter(|p| !p.is_empty()).context(
                "a password is required to encrypt the wallet \
                 (--password or RLUSD_WALLET_PASSWORD); use --plaintext for a clear-text file",
            )?,
        },
    };

    let wallet = Wallet::generate();
    let path = save_wallet(&config.wallets_dir, &wallet, desk.network, &format)?;
    let req = XrpRequirements::default();

    println!("New {} wallet", desk.network.as_str());
    println!("  Address:    {}", wallet.address());
    println!("  Public key: {}", wallet.public_key().to_hex());
    println!("  Saved to:   {}", path.display());
    println!("  Explorer:   {}", desk.network.account_url(wallet.address().as_str()));
    println!();
    println!(
        "Send at least {} XRP to activate it ({} XRP recommended for routine use).",
        req.minimum_funding, req.safe_operational
    );
    if plaintext.is_some() {
        println!("The file holds the seed in clear text. Move it somewhere safe.");
    }
    Ok(())
}

fn print_report(desk: &Desk, address: &Address, report: &AccountReport) {
    let line = report.trustline_or_absent();
    println!("Account {address}");
    if !report.account.exists {
        println!("  Not activated on {}", desk.network.as_str());
        return;
    }
    println!("  XRP balance: {}", report.account.balance);
    if let Some(sequence) = report.account.sequence {
        println!("  Sequence:    {sequence}");
    }
    if line.has_trustline {
        println!(
            "  {} balance: {} (limit {})",
            desk.currency, line.balance, line.limit
        );
    } else {
        println!("  No {} trustline to {}", desk.currency, desk.issuer);
    }
}

async fn check_wallet(desk: &Desk, raw: &str) -> anyhow::Result<()> {
    let address = Address::parse(raw.trim())?;
    let report = desk.report(&address).await?;
    print_report(desk, &address, &report);

    let req = XrpRequirements::default();
    if !report.account.exists {
        println!(
            "Send at least {} XRP to activate it, then run `rlusd wallet setup`.",
            req.minimum_funding
        );
    } else if !report.trustline_or_absent().has_trustline {
        let xrp = parse_decimal(&report.account.balance)?;
        let needed = req.reserve_for(1);
        if xrp < needed {
            println!("Top up to at least {needed} XRP before creating the trustline.");
        } else {
            println!("Ready for `rlusd wallet setup`.");
        }
    }
    println!("  Explorer: {}", desk.network.account_url(address.as_str()));
    Ok(())
}

async fn setup_wallet(
    desk: &Desk,
    signer: &SignerArgs,
    expected: Option<&str>,
    limit: Option<&str>,
) -> anyhow::Result<()> {
    let wallet = signer.load()?;
    if let Some(expected) = expected {
        wallet.ensure_address(&Address::parse(expected.trim())?)?;
    }
    let limit = TokenAmount::parse(limit.unwrap_or(DEFAULT_TRUST_LIMIT))?;
    let manager = TrustlineManager {
        submit: SubmitConfig {
            poll_interval: desk.poll_interval,
        },
        ..TrustlineManager::default()
    };

    let mut conn = desk.connect().await?;
    let outcome = manager
        .ensure_trustline(&conn, &wallet, &desk.issuer, &desk.currency, limit)
        .await;
    conn.close().await;

    match outcome? {
        TrustlineOutcome::Existing(line) => {
            println!(
                "{} already trusts {} for {} (limit {}, balance {}).",
                wallet.address(),
                desk.issuer,
                desk.currency,
                line.limit,
                line.balance
            );
        }
        TrustlineOutcome::Created { validated, limit } => {
            println!(
                "Trustline created: {} trusts {} for up to {limit} {}.",
                wallet.address(),
                desk.issuer,
                desk.currency
            );
            println!("  Ledger:   {}", validated.ledger_index);
            println!("  Explorer: {}", desk.network.transaction_url(&validated.hash));
        }
    }
    Ok(())
}

async fn wait_funding(desk: &Desk, raw: &str, wait: &FundingWait) -> anyhow::Result<()> {
    let address = Address::parse(raw.trim())?;
    println!(
        "Waiting for {address} to hold at least {} XRP...",
        wait.minimum_xrp
    );
    let mut conn = desk.connect().await?;
    let status = wait_for_funding(&conn, &address, wait).await;
    conn.close().await;
    let status = status?;
    println!("Funded: {} XRP.", status.balance);
    Ok(())
}

async fn balance(desk: &Desk, raw: &str) -> anyhow::Result<()> {
    let address = Address::parse(raw.trim())?;
    let report = desk.report(&address).await?;
    print_report(desk, &address, &report);
    Ok(())
}

async fn send(
    desk: &Desk,
    signer: &SignerArgs,
    to: String,
    amount: String,
    tag: Option<String>,
) -> anyhow::Result<()> {
    let wallet = signer.load()?;
    let mut submitter = PaymentSubmitter::default();
    submitter.submit.poll_interval = desk.poll_interval;
    let request = PaymentRequest {
        destination: to,
        amount,
        currency: desk.currency,
        issuer: desk.issuer.clone(),
        destination_tag: tag,
    };

    let mut conn = desk.connect().await?;
    let sent = submitter.send(&conn, &wallet, &request).await;
    let balances = match &sent {
        Ok(receipt) => confirm_balances(&conn, receipt).await.ok(),
        Err(_) => None,
    };
    conn.close().await;
    let receipt = sent?;

    println!(
        "Sent {} {} from {} to {}.",
        receipt.amount, desk.currency, receipt.from, receipt.to
    );
    println!("  Hash:     {}", receipt.validated.hash);
    println!("  Ledger:   {}", receipt.validated.ledger_index);
    println!("  Fee:      {} drops", receipt.fee_drops);
    println!("  Explorer: {}", desk.network.transaction_url(&receipt.validated.hash));
    if let Some(b) = balances {
        println!("  Sender balance:      {}", b.sender.balance);
        println!("  Destination balance: {}", b.destination.balance);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlusd_nullables::NullLedger;
    use rlusd_types::params::DEFAULT_ISSUER;
    use rlusd_types::{Decimal, Seed};
    use rlusd_wallet_core::WalletError;

    fn desk(ledger: &NullLedger) -> Desk {
        let issuer = Address::parse(DEFAULT_ISSUER).unwrap();
        ledger.fund(&issuer, 100);
        Desk {
            network: Network::Testnet,
            endpoints: NullLedger::endpoints(),
            connector: Arc::new(ledger.clone()),
            issuer,
            currency: CurrencyCode::parse("RLUSD").unwrap(),
            poll_interval: Duration::from_millis(1),
        }
    }

    fn signer(wallet: &Wallet) -> SignerArgs {
        SignerArgs {
            seed: Some(wallet.seed_text()),
            keystore: None,
            password: None,
        }
    }

    fn wallet(byte: u8) -> Wallet {
        Wallet::from_seed_bytes(Seed([byte; 16]))
    }

    fn files_in(dir: &std::path::Path) -> Vec<PathBuf> {
        match std::fs::read_dir(dir) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    #[tokio::test]
    async fn setup_refuses_a_seed_for_another_address() {
        let ledger = NullLedger::new();
        let desk = desk(&ledger);
        let holder = wallet(31);
        ledger.fund(holder.address(), 50);
        let other = wallet(32);

        let err = setup_wallet(&desk, &signer(&holder), Some(other.address().as_str()), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WalletError>(),
            Some(WalletError::SeedMismatch { .. })
        ));
        assert!(ledger.connect_attempts().is_empty());
        assert_eq!(ledger.submission_count(), 0);
    }

    #[tokio::test]
    async fn setup_creates_the_trustline_with_the_given_limit() {
        let ledger = NullLedger::new();
        let desk = desk(&ledger);
        let holder = wallet(33);
        ledger.fund(holder.address(), 50);

        setup_wallet(&desk, &signer(&holder), Some(holder.address().as_str()), Some("5000"))
            .await
            .unwrap();
        let line = ledger
            .trustline(holder.address(), &desk.issuer, desk.currency)
            .unwrap();
        assert_eq!(line.limit, Decimal::from(5000));
        assert_eq!(ledger.submission_count(), 1);
        assert_eq!(ledger.close_count(), 1);
    }

    #[test]
    fn wallet_create_needs_a_password_unless_plaintext_is_chosen() {
        let ledger = NullLedger::new();
        let desk = desk(&ledger);
        let dir = tempfile::tempdir().unwrap();
        let config = DeskConfig {
            wallets_dir: dir.path().join("wallets"),
            ..DeskConfig::default()
        };

        let err = create_wallet(&desk, &config, None, None).unwrap_err();
        assert!(err.to_string().contains("password"));
        let err = create_wallet(&desk, &config, None, Some(String::new())).unwrap_err();
        assert!(err.to_string().contains("--plaintext"));
        assert!(files_in(&config.wallets_dir).is_empty());

        create_wallet(&desk, &config, Some(PlaintextFormat::Json), None).unwrap();
        let files = files_in(&config.wallets_dir);
        assert_eq!(files.len(), 1);
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&files[0]).unwrap()).unwrap();
        assert!(value["seed"].as_str().unwrap().starts_with("sEd"));
        assert_eq!(value["network"], "testnet");
    }

    #[test]
    fn wallet_create_with_password_writes_a_keystore() {
        let ledger = NullLedger::new();
        let desk = desk(&ledger);
        let dir = tempfile::tempdir().unwrap();
        let config = DeskConfig {
            wallets_dir: dir.path().to_path_buf(),
            ..DeskConfig::default()
        };

        create_wallet(&desk, &config, None, Some("hunter2".into())).unwrap();
        let files = files_in(dir.path());
        assert_eq!(files.len(), 1);
        let keystore = load_keystore(&files[0]).unwrap();
        let restored = decrypt_keystore(&keystore, "hunter2").unwrap();
        assert_eq!(restored.address().as_str(), keystore.address);
    }

    #[tokio::test]
    async fn send_reaches_the_ledger_once() {
        let ledger = NullLedger::new();
        let desk = desk(&ledger);
        let sender = wallet(34);
        let receiver = wallet(35);
        for address in [sender.address(), receiver.address()] {
            ledger.fund(address, 30);
        }
        ledger.add_trustline(sender.address(), &desk.issuer, desk.currency, "100", "1000000");
        ledger.add_trustline(receiver.address(), &desk.issuer, desk.currency, "0", "1000000");

        send(
            &desk,
            &signer(&sender),
            receiver.address().to_string(),
            "12.5".into(),
            Some("77".into()),
        )
        .await
        .unwrap();

        assert_eq!(ledger.submission_count(), 1);
        assert_eq!(ledger.submissions()[0].destination_tag, Some(77));
        let received = ledger
            .trustline(receiver.address(), &desk.issuer, desk.currency)
            .unwrap();
        assert_eq!(received.balance, "12.5".parse::<Decimal>().unwrap());
        assert_eq!(ledger.close_count(), ledger.connect_attempts().len());
    }

    #[tokio::test]
    async fn send_without_a_signer_touches_nothing() {
        let ledger = NullLedger::new();
        let desk = desk(&ledger);
        let signer = SignerArgs {
            seed: None,
            keystore: None,
            password: None,
        };
        let err = send(&desk, &signer, DEFAULT_ISSUER.into(), "1".into(), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no wallet given"));
        assert!(ledger.connect_attempts().is_empty());
    }
}
