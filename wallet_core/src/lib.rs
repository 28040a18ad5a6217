//! Wallet-side workflows for the RLUSD desk.
//!
//! - [`Wallet`]: a signing identity derived from an ed25519 or secp256k1 family seed
//! - [`TrustlineManager`]: idempotent trustline setup
//! - [`PaymentSubmitter`]: payments guarded by local and ledger-state checks
//! - [`keystore`] and [`files`]: encrypted and opt-in plaintext wallet files

pub mod error;
pub mod files;
pub mod keystore;
pub mod payment;
pub mod trustline;
pub mod wallet;

pub use error::{AccountStateError, WalletError};
pub use files::{save_wallet, wallet_file_name, ExportFormat, PlaintextWallet};
pub use keystore::{
    decrypt_keystore, encrypt_keystore, load_keystore, save_keystore, KeystoreFile,
};
pub use payment::{
    confirm_balances, parse_destination_tag, BalanceConfirmation, PaymentReceipt,
    PaymentRequest, PaymentSubmitter,
};
pub use trustline::{TrustlineManager, TrustlineOutcome};
pub use wallet::Wallet;
