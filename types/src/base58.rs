//! Base58Check using the XRP Ledger alphabet.
//!
//! Payloads are suffixed with the first 4 bytes of `SHA-256(SHA-256(payload))`.

use sha2::{Digest, Sha256};

/// The XRP Ledger base58 dictionary.
pub const XRPL_ALPHABET: &[u8; 58] = b"rpshnaf39wBUDNEGHJKLM4PQRST7VWXYZ2bcdeCg65jkm8oFqi1tuvAxyz";

const CHECKSUM_LEN: usize = 4;

fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let first = Sha256::digest(payload);
    let second = Sha256::digest(first);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&second[..CHECKSUM_LEN]);
    out
}

/// Encode `payload` (version prefix included) with a trailing checksum.
pub fn encode_check(payload: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    bytes.extend_from_slice(payload);
    bytes.extend_from_slice(&checksum(payload));
    bs58::encode(bytes)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_string()
}

/// Decode a Base58Check string, verify its checksum and return the payload.
///
/// Returns `None` for characters outside the alphabet, inputs too short to
/// carry a checksum, or a checksum mismatch.
pub fn decode_check(input: &str) -> Option<Vec<u8>> {
    let mut bytes = bs58::decode(input)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_vec()
        .ok()?;
    if bytes.len() <= CHECKSUM_LEN {
        return None;
    }
    let sum = bytes.split_off(bytes.len() - CHECKSUM_LEN);
    if checksum(&bytes)[..] != sum[..] {
        return None;
    }
    Some(bytes)
}
