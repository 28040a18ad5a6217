//! Single-signing and transaction ids.

use rlusd_crypto::{sha512_half_prefixed, sign_message, HashPrefix, KeyPair};
use rlusd_types::{PublicKey, TxHash};

use crate::codec::encode;
use crate::error::CodecError;
use crate::prepared::PreparedTx;

/// A signed transaction ready for `submit`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTx {
    /// Upper-case hex of the serialized transaction.
    pub tx_blob: String,
    pub hash: TxHash,
}

/// The bytes a key signs: `STX\0` followed by the signing form.
pub fn signing_payload(tx: &PreparedTx, signing_pub_key: &PublicKey) -> Result<Vec<u8>, CodecError> {
    let mut payload = HashPrefix::TransactionSign.bytes().to_vec();
    payload.extend(encode(tx, signing_pub_key, None)?);
    Ok(payload)
}

/// `SHA-512Half(TXN\0 || blob)`.
pub fn transaction_hash(blob: &[u8]) -> TxHash {
    TxHash::new(sha512_half_prefixed(HashPrefix::TransactionId, blob))
}

/// Sign `tx` with `keypair` and compute its id.
pub fn sign_prepared(tx: &PreparedTx, keypair: &KeyPair) -> Result<SignedTx, CodecError> {
    let payload = signing_payload(tx, &keypair.public)?;
    let signature = sign_message(&payload, keypair)?;
    let blob = encode(tx, &keypair.public, Some(signature.as_slice()))?;
    Ok(SignedTx {
        tx_blob: hex::encode_upper(&blob),
        hash: transaction_hash(&blob),
    })
}
