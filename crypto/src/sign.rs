//! Message signing and verification for both key types.
//!
//! Ed25519 signs the message itself. Secp256k1 signs `SHA-512Half(message)`
//! with a deterministic nonce and emits a low-S DER signature.

use ed25519_dalek::{Signer, Verifier, VerifyingKey};
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use rlusd_types::{KeyType, PublicKey};

use crate::error::CryptoError;
use crate::hash::sha512_half;
use crate::keys::KeyPair;

/// Sign a message, returning the signature bytes the ledger expects in `TxnSignature`.
pub fn sign_message(message: &[u8], keypair: &KeyPair) -> Result<Vec<u8>, CryptoError> {
    match keypair.key_type {
        KeyType::Ed25519 => {
            let signing_key = ed25519_dalek::SigningKey::from_bytes(&keypair.private.0);
            Ok(signing_key.sign(message).to_bytes().to_vec())
        }
        KeyType::Secp256k1 => {
            let signing_key = k256::ecdsa::SigningKey::from_slice(&keypair.private.0)
                .map_err(|_| CryptoError::Signing)?;
            let signature: k256::ecdsa::Signature = signing_key
                .sign_prehash(&sha512_half(message))
                .map_err(|_| CryptoError::Signing)?;
            let signature = signature.normalize_s().unwrap_or(signature);
            Ok(signature.to_der().as_bytes().to_vec())
        }
    }
}

/// Verify a signature against a message and a 33-byte ledger public key.
pub fn verify_signature(
    message: &[u8],
    signature: &[u8],
    public_key: &PublicKey,
) -> Result<bool, CryptoError> {
    match public_key.key_type().ok_or(CryptoError::UnknownKeyType)? {
        KeyType::Ed25519 => {
            let point = public_key.ed25519_point().ok_or(CryptoError::UnknownKeyType)?;
            let Ok(verifying_key) = VerifyingKey::from_bytes(&point) else {
                return Ok(false);
            };
            let Ok(bytes) = <[u8; 64]>::try_from(signature) else {
                return Ok(false);
            };
            let sig = ed25519_dalek::Signature::from_bytes(&bytes);
            Ok(verifying_key.verify(message, &sig).is_ok())
        }
        KeyType::Secp256k1 => {
            let Ok(verifying_key) = k256::ecdsa::VerifyingKey::from_sec1_bytes(public_key.as_bytes())
            else {
                return Ok(false);
            };
            let Ok(sig) = k256::ecdsa::Signature::from_der(signature) else {
                return Ok(false);
            };
            Ok(verifying_key
                .verify_prehash(&sha512_half(message), &sig)
                .is_ok())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{derive_keypair, generate_keypair, keypair_from_seed};
    use rlusd_types::Seed;

    #[test]
    fn sign_and_verify() {
        let (_, kp) = generate_keypair();
        let sig = sign_message(b"payment", &kp).unwrap();
        assert_eq!(sig.len(), 64);
        assert!(verify_signature(b"payment", &sig, &kp.public).unwrap());
        assert!(!verify_signature(b"other", &sig, &kp.public).unwrap());
    }

    #[test]
    fn signature_deterministic() {
        let kp = keypair_from_seed(&Seed([9u8; 16]));
        assert_eq!(sign_message(b"x", &kp).unwrap(), sign_message(b"x", &kp).unwrap());
    }

    #[test]
    fn secp256k1_signature_is_low_s_der() {
        let kp = derive_keypair(&Seed([9u8; 16]), KeyType::Secp256k1).unwrap();
        let sig = sign_message(b"trust set", &kp).unwrap();
        assert_eq!(sig[0], 0x30);
        assert_eq!(sig[1] as usize, sig.len() - 2);
        let parsed = k256::ecdsa::Signature::from_der(&sig).unwrap();
        assert!(parsed.normalize_s().is_none());
        assert_eq!(sig, sign_message(b"trust set", &kp).unwrap());
        assert!(verify_signature(b"trust set", &sig, &kp.public).unwrap());
        assert!(!verify_signature(b"payment", &sig, &kp.public).unwrap());
    }

    #[test]
    fn signature_from_other_algorithm_fails() {
        let seed = Seed([9u8; 16]);
        let ed = derive_keypair(&seed, KeyType::Ed25519).unwrap();
        let secp = derive_keypair(&seed, KeyType::Secp256k1).unwrap();
        let sig = sign_message(b"x", &ed).unwrap();
        assert!(!verify_signature(b"x", &sig, &secp.public).unwrap());
    }

    #[test]
    fn unknown_key_prefix_rejected() {
        let (_, kp) = generate_keypair();
        let sig = sign_message(b"x", &kp).unwrap();
        let mut bytes = *kp.public.as_bytes();
        bytes[0] = 0x05;
        assert_eq!(
            verify_signature(b"x", &sig, &PublicKey(bytes)).unwrap_err(),
            CryptoError::UnknownKeyType
        );
    }
}
