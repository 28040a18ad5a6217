//! The signing identity.

use std::fmt;

use rlusd_crypto::{
    decode_seed, derive_address, derive_keypair, encode_seed, generate_keypair, keypair_from_seed,
    KeyPair,
};
use rlusd_transactions::{sign_prepared, PreparedTx, SignedTx};
use rlusd_types::{Address, KeyType, PublicKey, Seed};

use crate::error::WalletError;

/// An address plus the ability to sign for it.
///
/// Seed and private key never appear in `Debug` output and are zeroized on drop.
pub struct Wallet {
    seed: Seed,
    keypair: KeyPair,
    address: Address,
}

impl Wallet {
    /// Restore a wallet from its family seed, `sEd...` for ed25519 or `s...` for secp256k1.
    pub fn from_seed(encoded: &str) -> Result<Self, WalletError> {
        let (seed, key_type) = decode_seed(encoded.trim())?;
        Self::from_entropy(seed, key_type)
    }

    /// An ed25519 wallet from raw seed entropy.
    pub fn from_seed_bytes(seed: Seed) -> Self {
        let keypair = keypair_from_seed(&seed);
        Self::with_keypair(seed, keypair)
    }

    pub fn from_entropy(seed: Seed, key_type: KeyType) -> Result<Self, WalletError> {
        let keypair = derive_keypair(&seed, key_type)?;
        Ok(Self::with_keypair(seed, keypair))
    }

    fn with_keypair(seed: Seed, keypair: KeyPair) -> Self {
        let address = derive_address(&keypair.public);
        Self {
            seed,
            keypair,
            address,
        }
    }

    /// A wallet with fresh random entropy.
    pub fn generate() -> Self {
        let (seed, keypair) = generate_keypair();
        Self::with_keypair(seed, keypair)
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.keypair.public
    }

    pub fn key_type(&self) -> KeyType {
        self.keypair.key_type
    }

    /// Encoded family seed. Only for explicit export.
    pub fn seed_text(&self) -> String {
        encode_seed(&self.seed, self.keypair.key_type)
    }

    /// Raw seed entropy. Only for explicit export.
    pub(crate) fn seed_bytes(&self) -> &[u8; 16] {
        &self.seed.0
    }

    /// Private key in ledger hex form. Only for explicit export.
    pub fn private_key_hex(&self) -> String {
        self.keypair.private_key_hex()
    }

    /// Fail unless the wallet's address is `expected`.
    pub fn ensure_address(&self, expected: &Address) -> Result<(), WalletError> {
        if &self.address != expected {
            return Err(WalletError::SeedMismatch {
                expected: expected.to_string(),
                derived: self.address.to_string(),
            });
        }
        Ok(())
    }

    /// Sign a transaction prepared for this wallet's account.
    pub fn sign(&self, tx: &PreparedTx) -> Result<SignedTx, WalletError> {
        if tx.account != self.address {
            return Err(WalletError::AccountMismatch {
                tx_account: tx.account.to_string(),
                wallet: self.address.to_string(),
            });
        }
        Ok(sign_prepared(tx, &self.keypair)?)
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address.as_str())
            .field("seed", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlusd_crypto::verify_signature;
    use rlusd_transactions::{decode, signing_payload, TxIntent};
    use rlusd_types::{CurrencyCode, TokenAmount};

    const SEED: &str = "sEdSKaCy2JT7JaM7v95H9SxkhP9wS2r";
    const ADDRESS: &str = "rLUEXYuLiQptky37CqLcm9USQpPiz5rkpD";

    fn trust_set(account: Address) -> PreparedTx {
        PreparedTx {
            account,
            intent: TxIntent::trust_set(
                CurrencyCode::parse("RLUSD").unwrap(),
                Address::parse("rMxCKbEDwqr76QuheSUMdEGf4B9xJ8m5De").unwrap(),
                TokenAmount::parse("1000000").unwrap(),
            ),
            flags: 0,
            sequence: 7,
            fee_drops: 12,
            last_ledger_sequence: 1020,
            network_id: None,
        }
    }

    #[test]
    fn seed_restores_known_address() {
        let wallet = Wallet::from_seed(SEED).unwrap();
        assert_eq!(wallet.address().as_str(), ADDRESS);
        assert_eq!(wallet.seed_text(), SEED);
        assert!(wallet.ensure_address(&Address::parse(ADDRESS).unwrap()).is_ok());
    }

    #[test]
    fn secp256k1_seed_restores_and_signs() {
        let wallet = Wallet::from_seed("snoPBrXtMeMyMHUVTgbuqAfg1SUTb").unwrap();
        assert_eq!(wallet.key_type(), KeyType::Secp256k1);
        assert_eq!(wallet.address().as_str(), "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh");
        assert_eq!(wallet.seed_text(), "snoPBrXtMeMyMHUVTgbuqAfg1SUTb");
        assert!(wallet.private_key_hex().starts_with("00"));

        let tx = trust_set(wallet.address().clone());
        let signed = wallet.sign(&tx).unwrap();
        let decoded = decode(&hex::decode(&signed.tx_blob).unwrap()).unwrap();
        let payload = signing_payload(&tx, wallet.public_key()).unwrap();
        assert!(verify_signature(&payload, &decoded.signature.unwrap(), wallet.public_key()).unwrap());
    }

    #[test]
    fn mismatched_address_is_reported() {
        let wallet = Wallet::from_seed(SEED).unwrap();
        let other = Address::parse("rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh").unwrap();
        assert!(matches!(
            wallet.ensure_address(&other),
            Err(WalletError::SeedMismatch { .. })
        ));
    }

    #[test]
    fn malformed_seed_rejected() {
        assert!(Wallet::from_seed("not-a-seed").is_err());
        assert!(Wallet::from_seed("").is_err());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let wallet = Wallet::from_seed(SEED).unwrap();
        let debug = format!("{wallet:?}");
        assert!(debug.contains(ADDRESS));
        assert!(!debug.contains(SEED));
        assert!(!debug.contains(&wallet.private_key_hex()));
    }

    #[test]
    fn signature_verifies_over_signing_payload() {
        let wallet = Wallet::from_seed(SEED).unwrap();
        let tx = trust_set(wallet.address().clone());
        let signed = wallet.sign(&tx).unwrap();

        let blob = hex::decode(&signed.tx_blob).unwrap();
        let decoded = decode(&blob).unwrap();
        let signature = decoded.signature.unwrap();
        let payload = signing_payload(&tx, wallet.public_key()).unwrap();
        assert!(verify_signature(&payload, &signature, wallet.public_key()).unwrap());
    }

    #[test]
    fn refuses_to_sign_for_another_account() {
        let wallet = Wallet::from_seed(SEED).unwrap();
        let tx = trust_set(Address::parse("rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh").unwrap());
        assert!(matches!(wallet.sign(&tx), Err(WalletError::AccountMismatch { .. })));
    }

    #[test]
    fn generated_wallets_differ() {
        let a = Wallet::generate();
        let b = Wallet::generate();
        assert_ne!(a.address(), b.address());
        assert!(a.seed_text().starts_with("sEd"));
    }
}
