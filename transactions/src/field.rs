//! Field identifiers and their canonical order.
//!
//! Serialized fields are sorted by `(type_code, field_code)`. The header is
//! one to three bytes depending on whether each code fits in a nibble.

use crate::error::CodecError;

/// The fields used by TrustSet and Payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    TransactionType,
    NetworkId,
    Flags,
    Sequence,
    DestinationTag,
    LastLedgerSequence,
    Amount,
    LimitAmount,
    Fee,
    SigningPubKey,
    TxnSignature,
    Account,
    Destination,
}

pub const TYPE_UINT16: u8 = 1;
pub const TYPE_UINT32: u8 = 2;
pub const TYPE_AMOUNT: u8 = 6;
pub const TYPE_BLOB: u8 = 7;
pub const TYPE_ACCOUNT: u8 = 8;

impl Field {
    pub const ALL: [Field; 13] = [
        Field::TransactionType,
        Field::NetworkId,
        Field::Flags,
        Field::Sequence,
        Field::DestinationTag,
        Field::LastLedgerSequence,
        Field::Amount,
        Field::LimitAmount,
        Field::Fee,
        Field::SigningPubKey,
        Field::TxnSignature,
        Field::Account,
        Field::Destination,
    ];

    /// `(type_code, field_code)`.
    pub fn code(self) -> (u8, u8) {
        match self {
            Self::TransactionType => (TYPE_UINT16, 2),
            Self::NetworkId => (TYPE_UINT32, 1),
            Self::Flags => (TYPE_UINT32, 2),
            Self::Sequence => (TYPE_UINT32, 4),
            Self::DestinationTag => (TYPE_UINT32, 14),
            Self::LastLedgerSequence => (TYPE_UINT32, 27),
            Self::Amount => (TYPE_AMOUNT, 1),
            Self::LimitAmount => (TYPE_AMOUNT, 3),
            Self::Fee => (TYPE_AMOUNT, 8),
            Self::SigningPubKey => (TYPE_BLOB, 3),
            Self::TxnSignature => (TYPE_BLOB, 4),
            Self::Account => (TYPE_ACCOUNT, 1),
            Self::Destination => (TYPE_ACCOUNT, 3),
        }
    }

    pub fn from_code(type_code: u8, field_code: u8) -> Result<Self, CodecError> {
        Self::ALL
            .into_iter()
            .find(|f| f.code() == (type_code, field_code))
            .ok_or(CodecError::UnknownField {
                type_code,
                field_code,
            })
    }

    pub fn header(self) -> Vec<u8> {
        let (type_code, field_code) = self.code();
        match (type_code < 16, field_code < 16) {
            (true, true) => vec![(type_code << 4) | field_code],
            (true, false) => vec![type_code << 4, field_code],
            (false, true) => vec![field_code, type_code],
            (false, false) => vec![0, type_code, field_code],
        }
    }
}

/// Read a field header at `pos`, returning the codes and the bytes consumed.
pub fn read_header(bytes: &[u8], pos: usize) -> Result<((u8, u8), usize), CodecError> {
    let byte = |i: usize| bytes.get(pos + i).copied().ok_or(CodecError::Truncated(pos + i));
    let first = byte(0)?;
    let (hi, lo) = (first >> 4, first & 0x0F);
    match (hi, lo) {
        (0, 0) => Ok(((byte(1)?, byte(2)?), 3)),
        (0, lo) => Ok(((byte(1)?, lo), 2)),
        (hi, 0) => Ok(((hi, byte(1)?), 2)),
        (hi, lo) => Ok(((hi, lo), 1)),
    }
}

/// Variable-length prefix for blobs and account ids.
pub fn encode_vl_length(len: usize) -> Result<Vec<u8>, CodecError> {
    if len <= 192 {
        Ok(vec![len as u8])
    } else if len <= 12_480 {
        let adjusted = len - 193;
        Ok(vec![193 + (adjusted >> 8) as u8, (adjusted & 0xFF) as u8])
    } else if len <= 918_744 {
        let adjusted = len - 12_481;
        Ok(vec![
            241 + (adjusted >> 16) as u8,
            ((adjusted >> 8) & 0xFF) as u8,
            (adjusted & 0xFF) as u8,
        ])
    } else {
        Err(CodecError::InvalidField("variable-length field too long"))
    }
}

/// Decode a variable-length prefix, returning `(length, prefix_len)`.
pub fn decode_vl_length(bytes: &[u8], pos: usize) -> Result<(usize, usize), CodecError> {
    let byte = |i: usize| {
        bytes
            .get(pos + i)
            .map(|b| *b as usize)
            .ok_or(CodecError::Truncated(pos + i))
    };
    let b1 = byte(0)?;
    match b1 {
        0..=192 => Ok((b1, 1)),
        193..=240 => Ok((193 + (b1 - 193) * 256 + byte(1)?, 2)),
        241..=254 => Ok((12_481 + (b1 - 241) * 65_536 + byte(1)? * 256 + byte(2)?, 3)),
        _ => Err(CodecError::InvalidField("variable-length prefix")),
    }
}
