//! Account id and classic address derivation.

use ripemd::Ripemd160;
use rlusd_types::{AccountId, Address, PublicKey};
use sha2::{Digest, Sha256};

/// `RIPEMD-160(SHA-256(public_key))` over the 33-byte ledger key.
pub fn account_id_from_public(public: &PublicKey) -> AccountId {
    let sha = Sha256::digest(public.as_bytes());
    let ripe = Ripemd160::digest(sha);
    let mut id = [0u8; 20];
    id.copy_from_slice(&ripe);
    AccountId(id)
}

/// Derive the classic address of a public key.
pub fn derive_address(public: &PublicKey) -> Address {
    Address::from_account_id(account_id_from_public(public))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::keypair_from_seed;
    use crate::seed::decode_seed;

    #[test]
    fn known_seed_derives_known_address() {
        let (seed, _) = decode_seed("sEdSKaCy2JT7JaM7v95H9SxkhP9wS2r").unwrap();
        let kp = keypair_from_seed(&seed);
        assert_eq!(derive_address(&kp.public).as_str(), "rLUEXYuLiQptky37CqLcm9USQpPiz5rkpD");
    }

    #[test]
    fn derived_address_is_valid() {
        let (_, kp) = crate::keys::generate_keypair();
        let address = derive_address(&kp.public);
        assert!(Address::is_valid(address.as_str()));
    }
}
