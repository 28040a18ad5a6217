//! Family seed encoding.
//!
//! An ed25519 seed is `[0x01, 0xE1, 0x4B] || entropy(16)` in Base58Check,
//! which always renders with an `sEd` prefix. A secp256k1 seed uses the
//! single-byte `0x21` prefix and renders as `s...`.

use rand::rngs::OsRng;
use rand::RngCore;
use rlusd_types::base58;
use rlusd_types::{KeyType, Seed};

use crate::error::CryptoError;

const ED25519_SEED_PREFIX: [u8; 3] = [0x01, 0xE1, 0x4B];
const SECP256K1_SEED_PREFIX: [u8; 1] = [0x21];
const ENTROPY_LEN: usize = 16;

fn prefix(key_type: KeyType) -> &'static [u8] {
    match key_type {
        KeyType::Ed25519 => &ED25519_SEED_PREFIX,
        KeyType::Secp256k1 => &SECP256K1_SEED_PREFIX,
    }
}

/// Generate 16 bytes of seed entropy from the OS random source.
pub fn generate_seed() -> Seed {
    let mut entropy = [0u8; ENTROPY_LEN];
    OsRng.fill_bytes(&mut entropy);
    Seed(entropy)
}

/// Encode seed entropy as a family seed for `key_type`.
pub fn encode_seed(seed: &Seed, key_type: KeyType) -> String {
    let prefix = prefix(key_type);
    let mut payload = Vec::with_capacity(prefix.len() + ENTROPY_LEN);
    payload.extend_from_slice(prefix);
    payload.extend_from_slice(&seed.0);
    let encoded = base58::encode_check(&payload);
    zeroize::Zeroize::zeroize(&mut payload);
    encoded
}

/// Decode a family seed into its entropy and the key type its prefix names.
pub fn decode_seed(encoded: &str) -> Result<(Seed, KeyType), CryptoError> {
    let mut payload = base58::decode_check(encoded.trim()).ok_or(CryptoError::SeedEncoding)?;
    let result = seed_from_payload(&payload);
    zeroize::Zeroize::zeroize(&mut payload);
    result
}

fn seed_from_payload(payload: &[u8]) -> Result<(Seed, KeyType), CryptoError> {
    let key_type = if payload.starts_with(&ED25519_SEED_PREFIX) {
        KeyType::Ed25519
    } else if payload.starts_with(&SECP256K1_SEED_PREFIX) {
        KeyType::Secp256k1
    } else {
        return Err(CryptoError::SeedEncoding);
    };
    let entropy = &payload[prefix(key_type).len()..];
    if entropy.len() != ENTROPY_LEN {
        return Err(CryptoError::SeedLength {
            expected: ENTROPY_LEN,
            actual: entropy.len(),
        });
    }
    let mut out = [0u8; ENTROPY_LEN];
    out.copy_from_slice(entropy);
    Ok((Seed(out), key_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_seed_has_sed_prefix() {
        let seed = generate_seed();
        let encoded = encode_seed(&seed, KeyType::Ed25519);
        assert!(encoded.starts_with("sEd"), "{encoded}");
        let (decoded, key_type) = decode_seed(&encoded).unwrap();
        assert_eq!(decoded.0, seed.0);
        assert_eq!(key_type, KeyType::Ed25519);
    }

    #[test]
    fn secp256k1_seed_decodes_with_its_type() {
        let (seed, key_type) = decode_seed("snoPBrXtMeMyMHUVTgbuqAfg1SUTb").unwrap();
        assert_eq!(key_type, KeyType::Secp256k1);
        // The genesis account seed is the first half of SHA-256("masterpassphrase").
        assert_eq!(hex::encode_upper(seed.0), "DEDCE9CE67B451D852FD4E846FCDE31C");
        assert_eq!(
            encode_seed(&seed, KeyType::Secp256k1),
            "snoPBrXtMeMyMHUVTgbuqAfg1SUTb"
        );
    }

    #[test]
    fn garbage_rejected() {
        assert_eq!(decode_seed("not-a-seed").unwrap_err(), CryptoError::SeedEncoding);
        assert_eq!(decode_seed("").unwrap_err(), CryptoError::SeedEncoding);
    }

    #[test]
    fn wrong_entropy_length_rejected() {
        let mut payload = ED25519_SEED_PREFIX.to_vec();
        payload.extend_from_slice(&[1u8; 15]);
        let encoded = base58::encode_check(&payload);
        assert_eq!(
            decode_seed(&encoded).unwrap_err(),
            CryptoError::SeedLength { expected: 16, actual: 15 }
        );
    }
}
