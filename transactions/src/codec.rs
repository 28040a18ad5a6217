//! Binary serialization of prepared transactions.

use rlusd_types::{AccountId, PublicKey};

use crate::amount::LedgerAmount;
use crate::error::CodecError;
use crate::field::{decode_vl_length, encode_vl_length, read_header, Field};
use crate::intent::{TxIntent, TxKind};
use crate::prepared::PreparedTx;

/// Serialize `tx` in canonical field order.
///
/// With `signature` absent the output is the signing form: every field but
/// `TxnSignature`, without the hash prefix.
pub fn encode(
    tx: &PreparedTx,
    signing_pub_key: &PublicKey,
    signature: Option<&[u8]>,
) -> Result<Vec<u8>, CodecError> {
    let mut fields: Vec<(Field, Vec<u8>)> = vec![
        (Field::TransactionType, tx.intent.kind().code().to_be_bytes().to_vec()),
        (Field::Flags, tx.flags.to_be_bytes().to_vec()),
        (Field::Sequence, tx.sequence.to_be_bytes().to_vec()),
        (
            Field::LastLedgerSequence,
            tx.last_ledger_sequence.to_be_bytes().to_vec(),
        ),
        (Field::Fee, LedgerAmount::Xrp(tx.fee_drops).encode()?),
        (Field::SigningPubKey, vl(signing_pub_key.as_bytes())?),
        (Field::Account, vl(tx.account.account_id().as_bytes())?),
    ];
    if let Some(id) = tx.network_id {
        fields.push((Field::NetworkId, id.to_be_bytes().to_vec()));
    }
    match &tx.intent {
        TxIntent::TrustSet(t) => {
            let limit = LedgerAmount::issued(&t.limit, t.currency, &t.issuer);
            fields.push((Field::LimitAmount, limit.encode()?));
        }
        TxIntent::Payment(p) => {
            let amount = LedgerAmount::issued(&p.amount, p.currency, &p.issuer);
            fields.push((Field::Amount, amount.encode()?));
            fields.push((Field::Destination, vl(p.destination.account_id().as_bytes())?));
            if let Some(tag) = p.destination_tag {
                fields.push((Field::DestinationTag, tag.to_be_bytes().to_vec()));
            }
        }
    }
    if let Some(sig) = signature {
        fields.push((Field::TxnSignature, vl(sig)?));
    }

    fields.sort_by_key(|(field, _)| field.code());
    let mut out = Vec::new();
    for (field, data) in fields {
        out.extend(field.header());
        out.extend(data);
    }
    Ok(out)
}

fn vl(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut out = encode_vl_length(data.len())?;
    out.extend_from_slice(data);
    Ok(out)
}

/// Fields recovered from a serialized transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedTx {
    pub kind: Option<TxKind>,
    pub network_id: Option<u32>,
    pub flags: Option<u32>,
    pub sequence: Option<u32>,
    pub destination_tag: Option<u32>,
    pub last_ledger_sequence: Option<u32>,
    pub amount: Option<LedgerAmount>,
    pub limit_amount: Option<LedgerAmount>,
    pub fee: Option<LedgerAmount>,
    pub signing_pub_key: Option<Vec<u8>>,
    pub signature: Option<Vec<u8>>,
    pub account: Option<AccountId>,
    pub destination: Option<AccountId>,
}

impl DecodedTx {
    pub fn fee_drops(&self) -> Option<u64> {
        match self.fee {
            Some(LedgerAmount::Xrp(drops)) => Some(drops),
            _ => None,
        }
    }
}

/// Parse a serialized transaction containing only the fields in [`Field`].
pub fn decode(bytes: &[u8]) -> Result<DecodedTx, CodecError> {
    let mut tx = DecodedTx::default();
    let mut pos = 0;
    while pos < bytes.len() {
        let ((type_code, field_code), used) = read_header(bytes, pos)?;
        pos += used;
        let field = Field::from_code(type_code, field_code)?;
        match field {
            Field::TransactionType => {
                let code = u16::from_be_bytes(take::<2>(bytes, pos)?);
                tx.kind = Some(TxKind::from_code(code)?);
                pos += 2;
            }
            Field::NetworkId
            | Field::Flags
            | Field::Sequence
            | Field::DestinationTag
            | Field::LastLedgerSequence => {
                let value = u32::from_be_bytes(take::<4>(bytes, pos)?);
                pos += 4;
                let slot = match field {
                    Field::NetworkId => &mut tx.network_id,
                    Field::Flags => &mut tx.flags,
                    Field::Sequence => &mut tx.sequence,
                    Field::DestinationTag => &mut tx.destination_tag,
                    _ => &mut tx.last_ledger_sequence,
                };
                *slot = Some(value);
            }
            Field::Amount | Field::LimitAmount | Field::Fee => {
                let (amount, used) = LedgerAmount::decode(bytes, pos)?;
                pos += used;
                match field {
                    Field::Amount => tx.amount = Some(amount),
                    Field::LimitAmount => tx.limit_amount = Some(amount),
                    _ => tx.fee = Some(amount),
                }
            }
            Field::SigningPubKey | Field::TxnSignature => {
                let data = read_vl(bytes, &mut pos)?;
                if field == Field::SigningPubKey {
                    tx.signing_pub_key = Some(data);
                } else {
                    tx.signature = Some(data);
                }
            }
            Field::Account | Field::Destination => {
                let data = read_vl(bytes, &mut pos)?;
                let id: [u8; 20] = data
                    .try_into()
                    .map_err(|_| CodecError::InvalidField("account id length"))?;
                if field == Field::Account {
                    tx.account = Some(AccountId(id));
                } else {
                    tx.destination = Some(AccountId(id));
                }
            }
        }
    }
    Ok(tx)
}

fn take<const N: usize>(bytes: &[u8], pos: usize) -> Result<[u8; N], CodecError> {
    let slice = bytes
        .get(pos..pos + N)
        .ok_or(CodecError::Truncated(bytes.len()))?;
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    Ok(out)
}

fn read_vl(bytes: &[u8], pos: &mut usize) -> Result<Vec<u8>, CodecError> {
    let (len, used) = decode_vl_length(bytes, *pos)?;
    *pos += used;
    let data = bytes
        .get(*pos..*pos + len)
        .ok_or(CodecError::Truncated(bytes.len()))?
        .to_vec();
    *pos += len;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlusd_types::{Address, CurrencyCode, TokenAmount};

    const SENDER: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";
    const ISSUER: &str = "rMxCKbEDwqr76QuheSUMdEGf4B9xJ8m5De";

    fn payment(tag: Option<u32>) -> PreparedTx {
        PreparedTx {
            account: Address::parse(SENDER).unwrap(),
            intent: TxIntent::payment(
                CurrencyCode::parse("RLUSD").unwrap(),
                Address::parse(ISSUER).unwrap(),
                Address::parse("rrrrrrrrrrrrrrrrrrrrrhoLvTp").unwrap(),
                TokenAmount::parse("12.5").unwrap(),
                tag,
            ),
            flags: 0,
            sequence: 7,
            fee_drops: 12,
            last_ledger_sequence: 120,
            network_id: None,
        }
    }

    fn pubkey() -> PublicKey {
        PublicKey::from_ed25519([3u8; 32])
    }

    #[test]
    fn signing_form_starts_with_transaction_type() {
        let bytes = encode(&payment(None), &pubkey(), None).unwrap();
        assert_eq!(&bytes[..3], &[0x12, 0x00, 0x00]);
        // Flags follows TransactionType.
        assert_eq!(bytes[3], 0x22);
    }

    #[test]
    fn signing_form_omits_signature() {
        let decoded = decode(&encode(&payment(None), &pubkey(), None).unwrap()).unwrap();
        assert!(decoded.signature.is_none());
        let signed = decode(&encode(&payment(None), &pubkey(), Some(&[9u8; 64][..])).unwrap()).unwrap();
        assert_eq!(signed.signature, Some(vec![9u8; 64]));
    }

    #[test]
    fn payment_fields_survive_decode() {
        let tx = payment(Some(4242));
        let decoded = decode(&encode(&tx, &pubkey(), Some(&[1u8; 64][..])).unwrap()).unwrap();
        assert_eq!(decoded.kind, Some(TxKind::Payment));
        assert_eq!(decoded.sequence, Some(7));
        assert_eq!(decoded.fee_drops(), Some(12));
        assert_eq!(decoded.last_ledger_sequence, Some(120));
        assert_eq!(decoded.destination_tag, Some(4242));
        assert_eq!(decoded.account, Some(*tx.account.account_id()));
        assert_eq!(decoded.destination, Some(AccountId([0u8; 20])));
        assert_eq!(decoded.signing_pub_key, Some(pubkey().as_bytes().to_vec()));
        match decoded.amount {
            Some(LedgerAmount::Issued { value, currency, .. }) => {
                assert_eq!(value.to_string(), "12.5");
                assert_eq!(currency.display_name(), "RLUSD");
            }
            other => panic!("unexpected amount {other:?}"),
        }
    }

    #[test]
    fn trust_set_carries_limit_and_network_id() {
        let tx = PreparedTx {
            intent: TxIntent::trust_set(
                CurrencyCode::parse("USD").unwrap(),
                Address::parse(ISSUER).unwrap(),
                TokenAmount::parse("1000000").unwrap(),
            ),
            network_id: Some(21_338),
            ..payment(None)
        };
        let decoded = decode(&encode(&tx, &pubkey(), None).unwrap()).unwrap();
        assert_eq!(decoded.kind, Some(TxKind::TrustSet));
        assert_eq!(decoded.network_id, Some(21_338));
        assert!(decoded.amount.is_none());
        assert!(decoded.destination.is_none());
        assert!(matches!(decoded.limit_amount, Some(LedgerAmount::Issued { .. })));
    }

    #[test]
    fn truncated_input_rejected() {
        let bytes = encode(&payment(None), &pubkey(), None).unwrap();
        assert!(decode(&bytes[..bytes.len() - 3]).is_err());
    }

    #[test]
    fn unknown_field_rejected() {
        // (2, 3) is not part of the field table.
        assert_eq!(
            decode(&[0x23, 0, 0, 0, 0]).unwrap_err(),
            CodecError::UnknownField { type_code: 2, field_code: 3 }
        );
    }
}
