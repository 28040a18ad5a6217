//! Wallet files under the wallets directory.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use rlusd_types::{Network, XrpRequirements};

use crate::error::WalletError;
use crate::keystore::encrypt_keystore;
use crate::wallet::Wallet;

const SECURITY_WARNING: &str = "KEEP THIS FILE SECURE! Never share your seed or private key!";

/// How a wallet is written to disk.
#[derive(Clone, PartialEq, Eq)]
pub enum ExportFormat {
    /// Argon2id + AES-256-GCM keystore.
    Encrypted { password: String },
    /// Clear-text JSON including seed and private key.
    PlaintextJson,
    /// Clear-text human-readable notes including seed and private key.
    PlaintextText,
}

impl ExportFormat {
    fn extension(&self) -> &'static str {
        match self {
            Self::Encrypted { .. } | Self::PlaintextJson => "json",
            Self::PlaintextText => "txt",
        }
    }
}

/// Clear-text wallet export.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaintextWallet {
    pub created: String,
    pub network: String,
    pub classic_address: String,
    pub public_key: String,
    pub private_key: String,
    pub seed: String,
    pub explorer: String,
    pub warning: String,
}

impl PlaintextWallet {
    fn new(wallet: &Wallet, network: Network, created: DateTime<Utc>) -> Self {
        Self {
            created: created.to_rfc3339_opts(SecondsFormat::Millis, true),
            network: network.as_str().to_string(),
            classic_address: wallet.address().to_string(),
            public_key: wallet.public_key().to_hex(),
            private_key: wallet.private_key_hex(),
            seed: wallet.seed_text(),
            explorer: network.account_url(wallet.address().as_str()),
            warning: SECURITY_WARNING.to_string(),
        }
    }
}

/// `wallet-<address>-<timestamp>.<ext>` with `:` and `.` in the timestamp replaced.
pub fn wallet_file_name(address: &str, created: DateTime<Utc>, extension: &str) -> String {
    let stamp = created
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("wallet-{address}-{stamp}.{extension}")
}

/// Write `wallet` into `dir`, creating it if needed, and return the file path.
pub fn save_wallet(
    dir: &Path,
    wallet: &Wallet,
    network: Network,
    format: &ExportFormat,
) -> Result<PathBuf, WalletError> {
    std::fs::create_dir_all(dir).map_err(|e| WalletError::io(dir, e))?;
    let created = Utc::now();
    let path = dir.join(wallet_file_name(
        wallet.address().as_str(),
        created,
        format.extension(),
    ));
    let body = match format {
        ExportFormat::Encrypted { password } => {
            serde_json::to_string_pretty(&encrypt_keystore(wallet, password)?)?
        }
        ExportFormat::PlaintextJson => {
            warn!(path = %path.display(), "writing seed and private key in clear text");
            serde_json::to_string_pretty(&PlaintextWallet::new(wallet, network, created))?
        }
        ExportFormat::PlaintextText => {
            warn!(path = %path.display(), "writing seed and private key in clear text");
            render_text(&PlaintextWallet::new(wallet, network, created))
        }
    };
    write_private(&path, &body)?;
    info!(address = %wallet.address(), path = %path.display(), "wallet file written");
    Ok(path)
}

/// Write `body` to `path`, readable and writable by the owner only on unix.
pub(crate) fn write_private(path: &Path, body: &str) -> Result<(), WalletError> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path).map_err(|e| WalletError::io(path, e))?;
    // `mode` only applies when the file is created.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .map_err(|e| WalletError::io(path, e))?;
    }
    file.write_all(body.as_bytes())
        .map_err(|e| WalletError::io(path, e))
}

fn render_text(w: &PlaintextWallet) -> String {
    let req = XrpRequirements::default();
    format!(
        "XRPL {network} WALLET\n\
         Generated: {created}\n\
         \n\
         PUBLIC INFORMATION:\n\
         Address: {address}\n\
         Public Key: {public}\n\
         \n\
         SECRET INFORMATION (KEEP SECURE!):\n\
         Seed: {seed}\n\
         Private Key: {private}\n\
         \n\
         IMPORTANT NOTES:\n\
         - This account needs at least {base} XRP to be activated\n\
         - Additional {owner} XRP reserve required for each trustline\n\
         - NEVER share your seed or private key with anyone\n\
         \n\
         Explorer: {explorer}\n\
         \n\
         NEXT STEPS:\n\
         1. Send at least {minimum} XRP to {address} to activate\n\
         2. Set up the trustline (requires an activated account)\n\
         3. Store this file securely and delete any copies\n",
        network = w.network.to_uppercase(),
        created = w.created,
        address = w.classic_address,
        public = w.public_key,
        seed = w.seed,
        private = w.private_key,
        base = req.base_reserve,
        owner = req.owner_reserve,
        minimum = req.minimum_funding,
        explorer = w.explorer,
    )
}
