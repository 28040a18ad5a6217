//! SHA-512Half and the ledger's hash prefixes.

use sha2::{Digest, Sha512};

/// Four-byte prefixes that domain-separate what is being hashed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashPrefix {
    /// `TXN\0`: id of a signed transaction.
    TransactionId,
    /// `STX\0`: single-signing payload.
    TransactionSign,
}

impl HashPrefix {
    pub fn bytes(self) -> [u8; 4] {
        match self {
            Self::TransactionId => [0x54, 0x58, 0x4E, 0x00],
            Self::TransactionSign => [0x53, 0x54, 0x58, 0x00],
        }
    }
}

/// First 32 bytes of SHA-512.
pub fn sha512_half(data: &[u8]) -> [u8; 32] {
    let digest = Sha512::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..32]);
    out
}

/// SHA-512Half over `prefix || data`.
pub fn sha512_half_prefixed(prefix: HashPrefix, data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha512::new();
    hasher.update(prefix.bytes());
    hasher.update(data);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..32]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_spell_ascii_tags() {
        assert_eq!(&HashPrefix::TransactionId.bytes()[..3], b"TXN");
        assert_eq!(&HashPrefix::TransactionSign.bytes()[..3], b"STX");
    }

    #[test]
    fn prefixed_equals_manual_concat() {
        let mut joined = HashPrefix::TransactionId.bytes().to_vec();
        joined.extend_from_slice(b"blob");
        assert_eq!(
            sha512_half_prefixed(HashPrefix::TransactionId, b"blob"),
            sha512_half(&joined)
        );
    }
}
