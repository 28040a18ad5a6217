//! Issued-currency codes.
//!
//! The ledger stores every currency as 160 bits. Three-character codes use the
//! "standard" layout (12 zero bytes, 3 ASCII bytes, 5 zero bytes) and are
//! reported by the server as plain text; anything else is reported as 40
//! upper-case hex characters. Longer ticker names such as `RLUSD` are packed
//! as zero-padded ASCII, which is how `524C5553440000...` is produced.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

const CODE_LEN: usize = 20;
const STANDARD_OFFSET: usize = 12;

/// A 160-bit currency code.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; CODE_LEN]);

impl CurrencyCode {
    /// Parse a code given as a 3-character ISO-style code, a 40-character
    /// hex string, or a 4 to 20 character ASCII ticker.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidCurrency(raw.to_string());
        if raw.len() == 40 {
            return Self::from_hex(raw);
        }
        if raw.eq_ignore_ascii_case("XRP") || raw.is_empty() || raw.len() > CODE_LEN {
            return Err(invalid());
        }
        if !raw.bytes().all(is_code_char) {
            return Err(invalid());
        }
        let mut bytes = [0u8; CODE_LEN];
        if raw.len() == 3 {
            bytes[STANDARD_OFFSET..STANDARD_OFFSET + 3].copy_from_slice(raw.as_bytes());
        } else if raw.len() > 3 {
            bytes[..raw.len()].copy_from_slice(raw.as_bytes());
        } else {
            return Err(invalid());
        }
        Ok(Self(bytes))
    }

    /// Parse a strict 40-character hex code.
    pub fn from_hex(raw: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidCurrencyHex(raw.to_string());
        if raw.len() != 40 || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let decoded = hex::decode(raw).map_err(|_| invalid())?;
        let mut bytes = [0u8; CODE_LEN];
        bytes.copy_from_slice(&decoded);
        Self::from_bytes(bytes).ok_or_else(invalid)
    }

    /// Wrap raw bytes, rejecting the encodings reserved for XRP.
    pub fn from_bytes(bytes: [u8; CODE_LEN]) -> Option<Self> {
        let code = Self(bytes);
        if bytes == [0u8; CODE_LEN] || (code.is_standard() && &bytes[12..15] == b"XRP") {
            return None;
        }
        Some(code)
    }

    pub fn as_bytes(&self) -> &[u8; CODE_LEN] {
        &self.0
    }

    /// Whether the code uses the 3-character standard layout.
    pub fn is_standard(&self) -> bool {
        self.0[..STANDARD_OFFSET].iter().all(|b| *b == 0)
            && self.0[STANDARD_OFFSET + 3..].iter().all(|b| *b == 0)
            && self.0[STANDARD_OFFSET..STANDARD_OFFSET + 3]
                .iter()
                .all(|b| is_code_char(*b))
    }

    /// The form used in ledger requests and responses.
    pub fn ledger_code(&self) -> String {
        if self.is_standard() {
            String::from_utf8_lossy(&self.0[STANDARD_OFFSET..STANDARD_OFFSET + 3]).into_owned()
        } else {
            hex::encode_upper(self.0)
        }
    }

    /// The 40-character hex form, regardless of layout.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// A human-readable ticker, falling back to the ledger form.
    pub fn display_name(&self) -> String {
        if self.is_standard() {
            return self.ledger_code();
        }
        let trimmed: Vec<u8> = self
            .0
            .iter()
            .copied()
            .rev()
            .skip_while(|b| *b == 0)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        if !trimmed.is_empty() && trimmed.iter().all(|b| is_code_char(*b)) {
            String::from_utf8_lossy(&trimmed).into_owned()
        } else {
            self.to_hex()
        }
    }

    /// Whether a currency string reported by the server denotes this code.
    pub fn matches(&self, reported: &str) -> bool {
        Self::parse(reported).map(|c| c == *self).unwrap_or(false)
    }
}

fn is_code_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"?!@#$%^&*<>(){}[]|".contains(&b)
}

impl fmt::Debug for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurrencyCode({})", self.display_name())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.ledger_code()
    }
}
