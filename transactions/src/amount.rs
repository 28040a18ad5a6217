//! Amount field encoding.
//!
//! XRP amounts are 8 bytes: bit 63 clear, bit 62 set for positive, then
//! drops. Issued amounts are 48 bytes: an 8-byte value, the 20-byte currency
//! code and the 20-byte issuer account id. The value packs a decimal mantissa
//! normalized to `[10^15, 10^16)` and an exponent in `[-96, 80]`.

use rust_decimal::Decimal;
use rlusd_types::{AccountId, Address, CurrencyCode, TokenAmount};

use crate::error::CodecError;

const NOT_XRP_BIT: u64 = 1 << 63;
const POSITIVE_BIT: u64 = 1 << 62;
const MANTISSA_MASK: u64 = (1 << 54) - 1;
const MIN_MANTISSA: i128 = 1_000_000_000_000_000;
const MAX_MANTISSA: i128 = 9_999_999_999_999_999;
const MIN_EXPONENT: i32 = -96;
const MAX_EXPONENT: i32 = 80;
const EXPONENT_BIAS: i32 = 97;
const MAX_DROPS: u64 = 100_000_000_000_000_000;
const MAX_DECIMAL_SCALE: u32 = 28;

/// An amount as it appears in a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerAmount {
    Xrp(u64),
    Issued {
        value: Decimal,
        currency: CurrencyCode,
        issuer: AccountId,
    },
}

impl LedgerAmount {
    pub fn issued(amount: &TokenAmount, currency: CurrencyCode, issuer: &Address) -> Self {
        Self::Issued {
            value: amount.value(),
            currency,
            issuer: *issuer.account_id(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        match self {
            Self::Xrp(drops) => {
                if *drops > MAX_DROPS {
                    return Err(CodecError::XrpOverflow(*drops));
                }
                Ok((drops | POSITIVE_BIT).to_be_bytes().to_vec())
            }
            Self::Issued {
                value,
                currency,
                issuer,
            } => {
                let mut out = Vec::with_capacity(48);
                out.extend_from_slice(&encode_issued_value(*value)?.to_be_bytes());
                out.extend_from_slice(currency.as_bytes());
                out.extend_from_slice(issuer.as_bytes());
                Ok(out)
            }
        }
    }

    /// Decode an amount at `pos`, returning it and the bytes consumed.
    pub fn decode(bytes: &[u8], pos: usize) -> Result<(Self, usize), CodecError> {
        let head = read_u64(bytes, pos)?;
        if head & NOT_XRP_BIT == 0 {
            return Ok((Self::Xrp(head & !POSITIVE_BIT), 8));
        }
        let end = pos + 48;
        if bytes.len() < end {
            return Err(CodecError::Truncated(bytes.len()));
        }
        let mut currency = [0u8; 20];
        currency.copy_from_slice(&bytes[pos + 8..pos + 28]);
        let mut issuer = [0u8; 20];
        issuer.copy_from_slice(&bytes[pos + 28..end]);
        let currency =
            CurrencyCode::from_bytes(currency).ok_or(CodecError::InvalidField("currency"))?;
        Ok((
            Self::Issued {
                value: decode_issued_value(head)?,
                currency,
                issuer: AccountId(issuer),
            },
            48,
        ))
    }

    /// JSON form used in `tx_json`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Xrp(drops) => serde_json::Value::String(drops.to_string()),
            Self::Issued {
                value,
                currency,
                issuer,
            } => serde_json::json!({
                "currency": currency.ledger_code(),
                "issuer": Address::from_account_id(*issuer).as_str(),
                "value": value.normalize().to_string(),
            }),
        }
    }
}

fn read_u64(bytes: &[u8], pos: usize) -> Result<u64, CodecError> {
    let slice = bytes
        .get(pos..pos + 8)
        .ok_or(CodecError::Truncated(bytes.len()))?;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(slice);
    Ok(u64::from_be_bytes(buf))
}

/// Pack a decimal into the 64-bit issued-value layout.
pub fn encode_issued_value(value: Decimal) -> Result<u64, CodecError> {
    if value.is_zero() {
        return Ok(NOT_XRP_BIT);
    }
    let negative = value.is_sign_negative();
    let mut mantissa = value.mantissa().abs();
    let mut exponent = -(value.scale() as i32);

    while mantissa > MAX_MANTISSA {
        if mantissa % 10 != 0 {
            return Err(CodecError::Precision(value.to_string()));
        }
        mantissa /= 10;
        exponent += 1;
    }
    while mantissa < MIN_MANTISSA {
        mantissa *= 10;
        exponent -= 1;
    }
    if !(MIN_EXPONENT..=MAX_EXPONENT).contains(&exponent) {
        return Err(CodecError::ExponentRange(exponent));
    }

    let mut bits = NOT_XRP_BIT | (((exponent + EXPONENT_BIAS) as u64) << 54) | mantissa as u64;
    if !negative {
        bits |= POSITIVE_BIT;
    }
    Ok(bits)
}

/// Unpack the 64-bit issued-value layout.
pub fn decode_issued_value(bits: u64) -> Result<Decimal, CodecError> {
    let mantissa = (bits & MANTISSA_MASK) as i128;
    if mantissa == 0 {
        return Ok(Decimal::ZERO);
    }
    let exponent = ((bits >> 54) & 0xFF) as i32 - EXPONENT_BIAS;
    let signed = if bits & POSITIVE_BIT != 0 { mantissa } else { -mantissa };

    let value = if exponent >= 0 {
        let mut value = Decimal::from_i128_with_scale(signed, 0);
        for _ in 0..exponent {
            value = value
                .checked_mul(Decimal::TEN)
                .ok_or(CodecError::ExponentRange(exponent))?;
        }
        value
    } else {
        let mut m = signed;
        let mut scale = (-exponent) as u32;
        while scale > MAX_DECIMAL_SCALE && m % 10 == 0 {
            m /= 10;
            scale -= 1;
        }
        if scale > MAX_DECIMAL_SCALE {
            return Err(CodecError::ExponentRange(exponent));
        }
        Decimal::from_i128_with_scale(m, scale)
    };
    Ok(value.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn zero_has_canonical_form() {
        assert_eq!(encode_issued_value(Decimal::ZERO).unwrap(), 0x8000_0000_0000_0000);
    }

    #[test]
    fn one_encodes_to_known_bits() {
        // 1 = 1000000000000000e-15
        assert_eq!(encode_issued_value(dec("1")).unwrap(), 0xD483_8D7E_A4C6_8000);
    }

    #[test]
    fn values_decode_to_themselves() {
        for s in ["1", "0.5", "1000000", "123.456", "0.000001", "9999999999999999"] {
            let bits = encode_issued_value(dec(s)).unwrap();
            assert_eq!(decode_issued_value(bits).unwrap(), dec(s).normalize(), "{s}");
        }
    }

    #[test]
    fn seventeen_significant_digits_rejected() {
        assert!(matches!(
            encode_issued_value(dec("12345678901234567")),
            Err(CodecError::Precision(_))
        ));
    }

    #[test]
    fn xrp_amount_sets_positive_bit() {
        let bytes = LedgerAmount::Xrp(12).encode().unwrap();
        assert_eq!(bytes, vec![0x40, 0, 0, 0, 0, 0, 0, 12]);
        assert_eq!(LedgerAmount::decode(&bytes, 0).unwrap(), (LedgerAmount::Xrp(12), 8));
    }

    #[test]
    fn issued_amount_layout() {
        let currency = CurrencyCode::parse("USD").unwrap();
        let issuer = AccountId([7u8; 20]);
        let amount = LedgerAmount::Issued {
            value: dec("25"),
            currency,
            issuer,
        };
        let bytes = amount.encode().unwrap();
        assert_eq!(bytes.len(), 48);
        assert_eq!(&bytes[8..28], currency.as_bytes());
        assert_eq!(&bytes[28..], issuer.as_bytes());
        let (decoded, used) = LedgerAmount::decode(&bytes, 0).unwrap();
        assert_eq!(used, 48);
        assert_eq!(decoded, amount);
    }
}
