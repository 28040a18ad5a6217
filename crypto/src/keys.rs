//! Key derivation from family seeds.

use ed25519_dalek::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::PrimeField;
use k256::SecretKey;
use rlusd_types::{KeyType, PrivateKey, PublicKey, Seed};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::hash::sha512_half;
use crate::seed::generate_seed;

/// A derived key pair.
///
/// Construct with [`keypair_from_seed`], [`derive_keypair`] or [`generate_keypair`].
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
    pub key_type: KeyType,
}

impl KeyPair {
    /// Private key in ledger hex form (`ED...` or `00...`).
    pub fn private_key_hex(&self) -> String {
        self.private.to_ledger_hex(self.key_type)
    }
}

/// Derive the ed25519 key pair for a family seed: the secret key is `SHA-512Half(seed)`.
pub fn keypair_from_seed(seed: &Seed) -> KeyPair {
    let private = PrivateKey(sha512_half(&seed.0));
    let signing_key = SigningKey::from_bytes(&private.0);
    KeyPair {
        public: PublicKey::from_ed25519(signing_key.verifying_key().to_bytes()),
        private,
        key_type: KeyType::Ed25519,
    }
}

/// Derive the key pair of `key_type` for a family seed.
pub fn derive_keypair(seed: &Seed, key_type: KeyType) -> Result<KeyPair, CryptoError> {
    match key_type {
        KeyType::Ed25519 => Ok(keypair_from_seed(seed)),
        KeyType::Secp256k1 => secp256k1_keypair(seed),
    }
}

/// Generate a fresh seed and its ed25519 key pair.
pub fn generate_keypair() -> (Seed, KeyPair) {
    let seed = generate_seed();
    let keypair = keypair_from_seed(&seed);
    (seed, keypair)
}

/// Account key for account index 0: the root scalar plus an offset derived
/// from the compressed root public key, both mod the curve order.
fn secp256k1_keypair(seed: &Seed) -> Result<KeyPair, CryptoError> {
    let root = secp256k1_scalar(&seed.0, None)?;
    let root_public = root.public_key().to_encoded_point(true);
    let offset = secp256k1_scalar(root_public.as_bytes(), Some(0))?;

    let sum = *root.to_nonzero_scalar() + *offset.to_nonzero_scalar();
    let account = SecretKey::from_bytes(&sum.to_repr()).map_err(|_| CryptoError::KeyDerivation)?;

    let encoded = account.public_key().to_encoded_point(true);
    let public: [u8; 33] = encoded
        .as_bytes()
        .try_into()
        .map_err(|_| CryptoError::KeyDerivation)?;
    let mut private = [0u8; 32];
    private.copy_from_slice(&account.to_bytes());
    Ok(KeyPair {
        public: PublicKey(public),
        private: PrivateKey(private),
        key_type: KeyType::Secp256k1,
    })
}

/// First `SHA-512Half(input || [index] || counter)` that is a valid scalar.
fn secp256k1_scalar(input: &[u8], index: Option<u32>) -> Result<SecretKey, CryptoError> {
    for counter in 0..=u32::MAX {
        let mut buf = Zeroizing::new(input.to_vec());
        if let Some(index) = index {
            buf.extend_from_slice(&index.to_be_bytes());
        }
        buf.extend_from_slice(&counter.to_be_bytes());
        let candidate = Zeroizing::new(sha512_half(&buf));
        if let Ok(key) = SecretKey::from_slice(&candidate[..]) {
            return Ok(key);
        }
    }
    Err(CryptoError::KeyDerivation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::derive_address;
    use crate::seed::decode_seed;

    #[test]
    fn known_seed_derives_known_keys() {
        let (seed, key_type) = decode_seed("sEdSKaCy2JT7JaM7v95H9SxkhP9wS2r").unwrap();
        let kp = derive_keypair(&seed, key_type).unwrap();
        assert_eq!(
            kp.private_key_hex(),
            "EDB4C4E046826BD26190D09715FC31F4E6A728204EADD112905B08B14B7F15C4F3"
        );
        assert_eq!(
            kp.public.to_hex(),
            "ED01FA53FA5A7E77798F882ECE20B1ABC00BB358A9E55A202D0D0676BD0CE37A63"
        );
    }

    #[test]
    fn genesis_seed_derives_genesis_account() {
        let (seed, key_type) = decode_seed("snoPBrXtMeMyMHUVTgbuqAfg1SUTb").unwrap();
        let kp = derive_keypair(&seed, key_type).unwrap();
        assert_eq!(kp.key_type, KeyType::Secp256k1);
        assert_eq!(
            kp.public.to_hex(),
            "0330E7FC9D56BB25D6893BA3F317AE5BCF33B3291BD63DB32654A313222F7FD020"
        );
        assert_eq!(derive_address(&kp.public).as_str(), "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh");
    }

    #[test]
    fn secp256k1_seed_derives_known_keys() {
        let (seed, key_type) = decode_seed("sp5fghtJtpUorTwvof1NpDXAzNwf5").unwrap();
        let kp = derive_keypair(&seed, key_type).unwrap();
        assert_eq!(
            kp.private_key_hex(),
            "00D78B9735C3F26501C7337B8A5727FD53A6EFDBC6AA55984F098488561F985E23"
        );
        assert_eq!(
            kp.public.to_hex(),
            "030D58EB48B4420B1F7B9DF55087E0E29FEF0E8468F9A6825B01CA2C361042D435"
        );
        assert_eq!(derive_address(&kp.public).as_str(), "rU6K7V3Po4snVhBBaU29sesqs2qTQJWDw1");
    }

    #[test]
    fn derivation_is_deterministic() {
        let seed = Seed([42u8; 16]);
        let a = keypair_from_seed(&seed);
        let b = keypair_from_seed(&seed);
        assert_eq!(a.public, b.public);
        assert_eq!(a.private.0, b.private.0);
    }

    #[test]
    fn same_entropy_gives_different_keys_per_algorithm() {
        let seed = Seed([42u8; 16]);
        let ed = derive_keypair(&seed, KeyType::Ed25519).unwrap();
        let secp = derive_keypair(&seed, KeyType::Secp256k1).unwrap();
        assert_ne!(ed.public, secp.public);
        assert!(matches!(secp.public.as_bytes()[0], 0x02 | 0x03));
    }

    #[test]
    fn generated_keys_are_ed25519() {
        let (_, kp) = generate_keypair();
        assert_eq!(kp.public.as_bytes()[0], 0xED);
        assert!(kp.public.ed25519_point().is_some());
    }
}
