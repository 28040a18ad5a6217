//! Cryptographic primitives for XRP Ledger accounts.
//!
//! - **Family seeds** (`sEd...` and `s...`) carrying 16 bytes of entropy
//! - **Ed25519** keys derived as `SHA-512Half(seed)`
//! - **Secp256k1** root and account keys derived from the seed by rejection sampling
//! - **Account ids** as `RIPEMD-160(SHA-256(public_key))`
//! - Transaction signing over the `STX\0` prefixed serialization

pub mod address;
pub mod error;
pub mod hash;
pub mod keys;
pub mod seed;
pub mod sign;

pub use address::{account_id_from_public, derive_address};
pub use error::CryptoError;
pub use hash::{sha512_half, sha512_half_prefixed, HashPrefix};
pub use keys::{derive_keypair, generate_keypair, keypair_from_seed, KeyPair};
pub use seed::{decode_seed, encode_seed, generate_seed};
pub use sign::{sign_message, verify_signature};
