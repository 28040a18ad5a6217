//! Key material for ledger accounts.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Signing algorithm of an account key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    #[default]
    Ed25519,
    Secp256k1,
}

impl KeyType {
    /// Prefix of the private key in its 33-byte ledger hex form.
    pub fn private_key_prefix(self) -> &'static str {
        match self {
            KeyType::Ed25519 => "ED",
            KeyType::Secp256k1 => "00",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::Ed25519 => f.write_str("ed25519"),
            KeyType::Secp256k1 => f.write_str("secp256k1"),
        }
    }
}

/// 16 bytes of family-seed entropy.
///
/// Does not implement `Debug` output of its bytes, `Serialize` or `Clone`.
/// Bytes are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed(pub [u8; 16]);

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}

/// A 32-byte secret scalar (secp256k1) or secret key (ed25519).
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(pub [u8; 32]);

impl PrivateKey {
    /// Ledger hex form: the key type prefix followed by the 32 key bytes.
    pub fn to_ledger_hex(&self, key_type: KeyType) -> String {
        format!("{}{}", key_type.private_key_prefix(), hex::encode_upper(self.0))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// Type prefix marking an ed25519 public key in its 33-byte ledger form.
pub const ED25519_PREFIX: u8 = 0xED;

/// A 33-byte ledger public key: `0xED` + ed25519 point, or a compressed
/// secp256k1 point starting with `0x02`/`0x03`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; 33]);

impl PublicKey {
    pub fn from_ed25519(point: [u8; 32]) -> Self {
        let mut bytes = [0u8; 33];
        bytes[0] = ED25519_PREFIX;
        bytes[1..].copy_from_slice(&point);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// Algorithm implied by the first byte, `None` for an unknown prefix.
    pub fn key_type(&self) -> Option<KeyType> {
        match self.0[0] {
            ED25519_PREFIX => Some(KeyType::Ed25519),
            0x02 | 0x03 => Some(KeyType::Secp256k1),
            _ => None,
        }
    }

    /// The raw 32-byte ed25519 point, if this is an ed25519 key.
    pub fn ed25519_point(&self) -> Option<[u8; 32]> {
        if self.0[0] != ED25519_PREFIX {
            return None;
        }
        let mut point = [0u8; 32];
        point.copy_from_slice(&self.0[1..]);
        Some(point)
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_type_follows_prefix() {
        assert_eq!(PublicKey::from_ed25519([1u8; 32]).key_type(), Some(KeyType::Ed25519));
        let mut secp = [4u8; 33];
        secp[0] = 0x03;
        assert_eq!(PublicKey(secp).key_type(), Some(KeyType::Secp256k1));
        secp[0] = 0x04;
        assert_eq!(PublicKey(secp).key_type(), None);
    }

    #[test]
    fn private_hex_carries_type_prefix() {
        let key = PrivateKey([0xAB; 32]);
        assert!(key.to_ledger_hex(KeyType::Ed25519).starts_with("EDAB"));
        assert!(key.to_ledger_hex(KeyType::Secp256k1).starts_with("00AB"));
        assert_eq!(key.to_ledger_hex(KeyType::Secp256k1).len(), 66);
    }

    #[test]
    fn key_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&KeyType::Secp256k1).unwrap(), "\"secp256k1\"");
    }
}
