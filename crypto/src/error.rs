use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("seed is not valid base58check")]
    SeedEncoding,

    #[error("seed has wrong length: expected {expected} bytes, got {actual}")]
    SeedLength { expected: usize, actual: usize },

    #[error("public key has an unknown type prefix")]
    UnknownKeyType,

    #[error("seed does not derive a valid secp256k1 key")]
    KeyDerivation,

    #[error("secp256k1 signing failed")]
    Signing,
}
