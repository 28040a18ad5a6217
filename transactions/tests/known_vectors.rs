//! Wire bytes assembled by hand from the ledger's field definitions, and
//! hashes and signatures checked with the hash and curve crates directly.

use ed25519_dalek::Verifier;
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use rust_decimal::Decimal;
use sha2::{Digest, Sha512};

use rlusd_crypto::{decode_seed, derive_keypair, KeyPair};
use rlusd_transactions::amount::encode_issued_value;
use rlusd_transactions::{encode, sign_prepared, signing_payload, PreparedTx, TxIntent};
use rlusd_types::{AccountId, Address, CurrencyCode, TokenAmount};

const GENESIS_SEED: &str = "snoPBrXtMeMyMHUVTgbuqAfg1SUTb";
const GENESIS_ACCOUNT_ID: &str = "B5F762798A53D543A014CAF8B297CFF8F2F937E8";
const GENESIS_PUBLIC: &str = "0330E7FC9D56BB25D6893BA3F317AE5BCF33B3291BD63DB32654A313222F7FD020";
const RLUSD_HEX: &str = "524C555344000000000000000000000000000000";
const ACCOUNT_ONE_ID: &str = "0000000000000000000000000000000000000001";

fn genesis() -> KeyPair {
    let (seed, key_type) = decode_seed(GENESIS_SEED).unwrap();
    derive_keypair(&seed, key_type).unwrap()
}

fn genesis_address() -> Address {
    Address::parse("rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh").unwrap()
}

fn account_one() -> Address {
    let mut id = [0u8; 20];
    id[19] = 1;
    Address::from_account_id(AccountId(id))
}

fn rlusd() -> CurrencyCode {
    CurrencyCode::parse("RLUSD").unwrap()
}

fn trust_set() -> PreparedTx {
    PreparedTx {
        account: genesis_address(),
        intent: TxIntent::trust_set(
            rlusd(),
            account_one(),
            TokenAmount::parse("1000000").unwrap(),
        ),
        flags: 0x0002_0000,
        sequence: 7,
        fee_drops: 12,
        last_ledger_sequence: 123,
        network_id: None,
    }
}

fn payment() -> PreparedTx {
    PreparedTx {
        account: genesis_address(),
        intent: TxIntent::payment(
            rlusd(),
            account_one(),
            account_one(),
            TokenAmount::parse("2.5").unwrap(),
            Some(4242),
        ),
        flags: 0,
        sequence: 7,
        fee_drops: 12,
        last_ledger_sequence: 123,
        network_id: Some(21338),
    }
}

/// Signing form split around the slot `TxnSignature` (type 7, field 4) takes.
fn trust_set_wire() -> (String, String) {
    let head = [
        "120014", // TransactionType = TrustSet (20)
        "2200020000", // Flags = tfSetNoRipple
        "2400000007", // Sequence
        "201B0000007B", // LastLedgerSequence = 123
        "63D6038D7EA4C68000", // LimitAmount value 1e6
        RLUSD_HEX,
        ACCOUNT_ONE_ID,
        "68400000000000000C", // Fee = 12 drops
        "7321", // SigningPubKey, 33 bytes
        GENESIS_PUBLIC,
    ]
    .concat();
    let tail = ["8114", GENESIS_ACCOUNT_ID].concat();
    (head, tail)
}

fn payment_wire() -> (String, String) {
    let head = [
        "120000", // TransactionType = Payment (0)
        "210000535A", // NetworkID = 21338
        "2200000000", // Flags
        "2400000007", // Sequence
        "2E00001092", // DestinationTag = 4242
        "201B0000007B", // LastLedgerSequence = 123
        "61D488E1BC9BF04000", // Amount value 2.5
        RLUSD_HEX,
        ACCOUNT_ONE_ID,
        "68400000000000000C", // Fee = 12 drops
        "7321",
        GENESIS_PUBLIC,
    ]
    .concat();
    let tail = ["8114", GENESIS_ACCOUNT_ID, "8314", ACCOUNT_ONE_ID].concat();
    (head, tail)
}

fn sha512_half(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize()[..32]);
    out
}

/// Signed blob = head || 74 || vl || signature || tail; id = SHA-512Half("TXN\0" || blob).
fn check_signed(tx: &PreparedTx, (head, tail): (String, String)) {
    let keypair = genesis();
    let signed = sign_prepared(tx, &keypair).unwrap();
    let blob = hex::decode(&signed.tx_blob).unwrap();

    let head = hex::decode(head).unwrap();
    let tail = hex::decode(tail).unwrap();
    assert_eq!(&blob[..head.len()], &head[..]);
    assert_eq!(blob[head.len()], 0x74);
    let sig_len = blob[head.len() + 1] as usize;
    let sig_start = head.len() + 2;
    let signature = &blob[sig_start..sig_start + sig_len];
    assert_eq!(&blob[sig_start + sig_len..], &tail[..]);

    let digest = sha512_half(&[b"STX\0".as_slice(), head.as_slice(), tail.as_slice()]);
    let public = hex::decode(GENESIS_PUBLIC).unwrap();
    let verifying_key = k256::ecdsa::VerifyingKey::from_sec1_bytes(&public).unwrap();
    let parsed = k256::ecdsa::Signature::from_der(signature).unwrap();
    assert!(verifying_key.verify_prehash(&digest, &parsed).is_ok());

    let id = sha512_half(&[b"TXN\0".as_slice(), blob.as_slice()]);
    assert_eq!(signed.hash.to_hex(), hex::encode_upper(id));
}

#[test]
fn genesis_keys_match_published_values() {
    let keypair = genesis();
    assert_eq!(keypair.public.to_hex(), GENESIS_PUBLIC);
    let account_id = genesis_address().account_id().as_bytes().to_vec();
    assert_eq!(hex::encode_upper(account_id), GENESIS_ACCOUNT_ID);
}

#[test]
fn issued_one_has_published_encoding() {
    let bits = encode_issued_value(Decimal::ONE).unwrap();
    assert_eq!(format!("{bits:016X}"), "D4838D7EA4C68000");
}

#[test]
fn trust_set_signing_form_matches_hand_assembly() {
    let (head, tail) = trust_set_wire();
    let bytes = encode(&trust_set(), &genesis().public, None).unwrap();
    assert_eq!(hex::encode_upper(bytes), format!("{head}{tail}"));
}

#[test]
fn payment_signing_form_matches_hand_assembly() {
    let (head, tail) = payment_wire();
    let bytes = encode(&payment(), &genesis().public, None).unwrap();
    assert_eq!(hex::encode_upper(bytes), format!("{head}{tail}"));
}

#[test]
fn signing_payload_is_stx_prefix_and_signing_form() {
    let (head, tail) = payment_wire();
    let payload = signing_payload(&payment(), &genesis().public).unwrap();
    assert_eq!(hex::encode_upper(payload), format!("53545800{head}{tail}"));
}

#[test]
fn signed_trust_set_blob_and_id() {
    check_signed(&trust_set(), trust_set_wire());
}

#[test]
fn signed_payment_blob_and_id() {
    check_signed(&payment(), payment_wire());
}

#[test]
fn ed25519_signature_covers_the_signing_form() {
    let (seed, key_type) = decode_seed("sEdSKaCy2JT7JaM7v95H9SxkhP9wS2r").unwrap();
    let keypair = derive_keypair(&seed, key_type).unwrap();
    let tx = trust_set();
    let signed = sign_prepared(&tx, &keypair).unwrap();
    let blob = hex::decode(&signed.tx_blob).unwrap();

    let form = encode(&tx, &keypair.public, None).unwrap();
    // Account (8114 + 20 bytes) is the only field after the signature.
    let sig_start = blob.len() - 22 - 64;
    assert_eq!(&blob[sig_start - 2..sig_start], &[0x74, 0x40]);
    let signature: [u8; 64] = blob[sig_start..sig_start + 64].try_into().unwrap();

    let point: [u8; 32] = keypair.public.as_bytes()[1..].try_into().unwrap();
    let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(&point).unwrap();
    let message = [b"STX\0".as_slice(), form.as_slice()].concat();
    assert!(verifying_key
        .verify(&message, &ed25519_dalek::Signature::from_bytes(&signature))
        .is_ok());
    let id = sha512_half(&[b"TXN\0".as_slice(), blob.as_slice()]);
    assert_eq!(signed.hash.to_hex(), hex::encode_upper(id));
}
