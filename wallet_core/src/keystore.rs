//! Argon2id encrypted keystore for family seeds.
//!
//! 1. Argon2id derives a 32-byte key from the password and a random salt
//! 2. AES-256-GCM encrypts the 16 seed bytes under a random nonce
//! 3. The file stores the address in clear next to every parameter needed to decrypt

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::path::Path;
use zeroize::Zeroizing;

use rlusd_types::{KeyType, Seed};

use crate::error::WalletError;
use crate::files::write_private;
use crate::wallet::Wallet;

const ARGON2_MEMORY_KIB: u32 = 65536; // 64 MB
const ARGON2_ITERATIONS: u32 = 3;
const ARGON2_PARALLELISM: u32 = 1;
const ARGON2_OUTPUT_LEN: usize = 32;

const SALT_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const SEED_LEN: usize = 16;

const KEYSTORE_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeystoreFile {
    pub version: u32,
    /// Classic address of the encrypted wallet, readable without the password.
    pub address: String,
    /// Absent in older files, which only hold ed25519 seeds.
    #[serde(default)]
    pub key_type: KeyType,
    pub crypto: KeystoreCrypto,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeystoreCrypto {
    pub cipher: String,
    pub kdf: String,
    pub kdf_params: KdfParams,
    /// Hex-encoded salt.
    pub salt: String,
    /// Hex-encoded nonce.
    pub nonce: String,
    /// Hex-encoded ciphertext.
    pub ciphertext: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KdfParams {
    pub memory: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

/// Encrypt the wallet's seed under `password`.
pub fn encrypt_keystore(wallet: &Wallet, password: &str) -> Result<KeystoreFile, WalletError> {
    let params = KdfParams {
        memory: ARGON2_MEMORY_KIB,
        iterations: ARGON2_ITERATIONS,
        parallelism: ARGON2_PARALLELISM,
    };
    let mut rng = rand::thread_rng();
    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce_bytes);

    let derived_key = derive_key(password, &salt, &params)?;
    let cipher = Aes256Gcm::new_from_slice(derived_key.as_ref())
        .map_err(|e| WalletError::Keystore(format!("AES key init failed: {e}")))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), wallet.seed_bytes().as_ref())
        .map_err(|e| WalletError::Keystore(format!("encryption failed: {e}")))?;

    Ok(KeystoreFile {
        version: KEYSTORE_VERSION,
        address: wallet.address().to_string(),
        key_type: wallet.key_type(),
        crypto: KeystoreCrypto {
            cipher: "aes-256-gcm".to_string(),
            kdf: "argon2id".to_string(),
            kdf_params: params,
            salt: hex::encode(salt),
            nonce: hex::encode(nonce_bytes),
            ciphertext: hex::encode(ciphertext),
        },
    })
}

/// Decrypt a keystore and rebuild the wallet, checking it matches the stored address.
pub fn decrypt_keystore(keystore: &KeystoreFile, password: &str) -> Result<Wallet, WalletError> {
    if keystore.version != KEYSTORE_VERSION {
        return Err(WalletError::Keystore(format!(
            "unsupported keystore version: {}",
            keystore.version
        )));
    }
    let salt = hex::decode(&keystore.crypto.salt)
        .map_err(|e| WalletError::Keystore(format!("invalid salt hex: {e}")))?;
    let nonce_bytes = hex::decode(&keystore.crypto.nonce)
        .map_err(|e| WalletError::Keystore(format!("invalid nonce hex: {e}")))?;
    let ciphertext = hex::decode(&keystore.crypto.ciphertext)
        .map_err(|e| WalletError::Keystore(format!("invalid ciphertext hex: {e}")))?;
    if nonce_bytes.len() != NONCE_LEN {
        return Err(WalletError::Keystore(format!(
            "invalid nonce length: expected {NONCE_LEN}, got {}",
            nonce_bytes.len()
        )));
    }

    let derived_key = derive_key(password, &salt, &keystore.crypto.kdf_params)?;
    let cipher = Aes256Gcm::new_from_slice(derived_key.as_ref())
        .map_err(|e| WalletError::Keystore(format!("AES key init failed: {e}")))?;
    let plaintext = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
            .map_err(|_| {
                WalletError::Keystore("decryption failed: wrong password or corrupted data".into())
            })?,
    );
    if plaintext.len() != SEED_LEN {
        return Err(WalletError::Keystore(format!(
            "decrypted seed has wrong length: expected {SEED_LEN}, got {}",
            plaintext.len()
        )));
    }

    let mut bytes = [0u8; SEED_LEN];
    bytes.copy_from_slice(&plaintext);
    let wallet = Wallet::from_entropy(Seed(bytes), keystore.key_type)?;
    if wallet.address().as_str() != keystore.address {
        return Err(WalletError::SeedMismatch {
            expected: keystore.address.clone(),
            derived: wallet.address().to_string(),
        });
    }
    Ok(wallet)
}

pub fn save_keystore(keystore: &KeystoreFile, path: &Path) -> Result<(), WalletError> {
    let json = serde_json::to_string_pretty(keystore)?;
    write_private(path, &json)
}

pub fn load_keystore(path: &Path) -> Result<KeystoreFile, WalletError> {
    let json = std::fs::read_to_string(path).map_err(|e| WalletError::io(path, e))?;
    Ok(serde_json::from_str(&json)?)
}

fn derive_key(
    password: &str,
    salt: &[u8],
    kdf: &KdfParams,
) -> Result<Zeroizing<[u8; ARGON2_OUTPUT_LEN]>, WalletError> {
    let params = Params::new(
        kdf.memory,
        kdf.iterations,
        kdf.parallelism,
        Some(ARGON2_OUTPUT_LEN),
    )
    .map_err(|e| WalletError::Keystore(format!("Argon2 params error: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = Zeroizing::new([0u8; ARGON2_OUTPUT_LEN]);
    argon2
        .hash_password_into(password.as_bytes(), salt, output.as_mut())
        .map_err(|e| WalletError::Keystore(format!("Argon2 hashing failed: {e}")))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = "sEdSKaCy2JT7JaM7v95H9SxkhP9wS2r";

    #[test]
    fn encrypt_decrypt_restores_wallet() {
        let wallet = Wallet::from_seed(SEED).unwrap();
        let keystore = encrypt_keystore(&wallet, "correct horse").unwrap();
        assert_eq!(keystore.address, wallet.address().as_str());
        let restored = decrypt_keystore(&keystore, "correct horse").unwrap();
        assert_eq!(restored.seed_text(), SEED);
    }

    #[test]
    fn secp256k1_wallet_survives_keystore() {
        let wallet = Wallet::from_seed("snoPBrXtMeMyMHUVTgbuqAfg1SUTb").unwrap();
        let keystore = encrypt_keystore(&wallet, "pw").unwrap();
        assert_eq!(keystore.key_type, KeyType::Secp256k1);
        let restored = decrypt_keystore(&keystore, "pw").unwrap();
        assert_eq!(restored.address(), wallet.address());
        assert_eq!(restored.seed_text(), "snoPBrXtMeMyMHUVTgbuqAfg1SUTb");
    }

    #[test]
    fn keystore_without_key_type_is_ed25519() {
        let wallet = Wallet::from_seed(SEED).unwrap();
        let mut json = serde_json::to_value(encrypt_keystore(&wallet, "pw").unwrap()).unwrap();
        json.as_object_mut().unwrap().remove("key_type");
        let keystore: KeystoreFile = serde_json::from_value(json).unwrap();
        assert_eq!(keystore.key_type, KeyType::Ed25519);
        assert_eq!(decrypt_keystore(&keystore, "pw").unwrap().seed_text(), SEED);
    }

    #[test]
    fn wrong_password_fails() {
        let wallet = Wallet::from_seed(SEED).unwrap();
        let keystore = encrypt_keystore(&wallet, "right").unwrap();
        assert!(matches!(
            decrypt_keystore(&keystore, "wrong"),
            Err(WalletError::Keystore(_))
        ));
    }

    #[test]
    fn file_never_contains_the_seed() {
        let wallet = Wallet::from_seed(SEED).unwrap();
        let keystore = encrypt_keystore(&wallet, "pw").unwrap();
        let json = serde_json::to_string(&keystore).unwrap();
        assert!(!json.contains(SEED));
        assert!(json.contains("\"kdf\":\"argon2id\""));
        assert!(json.contains("\"cipher\":\"aes-256-gcm\""));
    }

    #[test]
    fn tampered_address_is_detected() {
        let wallet = Wallet::from_seed(SEED).unwrap();
        let mut keystore = encrypt_keystore(&wallet, "pw").unwrap();
        keystore.address = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh".into();
        assert!(matches!(
            decrypt_keystore(&keystore, "pw"),
            Err(WalletError::SeedMismatch { .. })
        ));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keystore.json");
        let wallet = Wallet::from_seed(SEED).unwrap();
        save_keystore(&encrypt_keystore(&wallet, "pw").unwrap(), &path).unwrap();
        let restored = decrypt_keystore(&load_keystore(&path).unwrap(), "pw").unwrap();
        assert_eq!(restored.address(), wallet.address());
    }

    #[test]
    fn unsupported_version_rejected() {
        let wallet = Wallet::from_seed(SEED).unwrap();
        let mut keystore = encrypt_keystore(&wallet, "pw").unwrap();
        keystore.version = 99;
        assert!(decrypt_keystore(&keystore, "pw").is_err());
    }
}
