//! Classic XRP Ledger addresses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::base58;
use crate::error::ValidationError;

/// Version byte prepended to an account id before Base58Check encoding.
const ACCOUNT_ID_PREFIX: u8 = 0x00;

/// The 20-byte account identifier, `RIPEMD-160(SHA-256(public_key))`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

/// A syntactically valid classic address (`r...`).
///
/// Construction always goes through [`Address::parse`] or
/// [`Address::from_account_id`], so holding an `Address` proves the
/// checksum and version byte were verified.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    text: String,
    account_id: AccountId,
}

impl Address {
    /// Parse and validate a classic address.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidAddress(raw.to_string());
        if !raw.starts_with('r') || raw.len() < 25 || raw.len() > 35 {
            return Err(invalid());
        }
        let payload = base58::decode_check(raw).ok_or_else(invalid)?;
        if payload.len() != 21 || payload[0] != ACCOUNT_ID_PREFIX {
            return Err(invalid());
        }
        let mut id = [0u8; 20];
        id.copy_from_slice(&payload[1..]);
        Ok(Self {
            text: raw.to_string(),
            account_id: AccountId(id),
        })
    }

    /// Encode an account id as a classic address.
    pub fn from_account_id(account_id: AccountId) -> Self {
        let mut payload = Vec::with_capacity(21);
        payload.push(ACCOUNT_ID_PREFIX);
        payload.extend_from_slice(&account_id.0);
        Self {
            text: base58::encode_check(&payload),
            account_id,
        }
    }

    /// Whether `raw` is a valid classic address.
    pub fn is_valid(raw: &str) -> bool {
        Self::parse(raw).is_ok()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";
    const ACCOUNT_ZERO: &str = "rrrrrrrrrrrrrrrrrrrrrhoLvTp";

    #[test]
    fn well_known_addresses_parse() {
        assert!(Address::is_valid(GENESIS));
        assert!(Address::is_valid("rMxCKbEDwqr76QuheSUMdEGf4B9xJ8m5De"));
        let zero = Address::parse(ACCOUNT_ZERO).unwrap();
        assert_eq!(zero.account_id().0, [0u8; 20]);
    }

    #[test]
    fn account_id_roundtrip_reproduces_text() {
        let parsed = Address::parse(GENESIS).unwrap();
        let rebuilt = Address::from_account_id(*parsed.account_id());
        assert_eq!(rebuilt.as_str(), GENESIS);
        assert_eq!(Address::from_account_id(AccountId([0u8; 20])).as_str(), ACCOUNT_ZERO);
    }

    #[test]
    fn malformed_addresses_rejected() {
        for raw in ["", "rInvalid", "xHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh", "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTT"] {
            assert!(
                matches!(Address::parse(raw), Err(ValidationError::InvalidAddress(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn serde_uses_plain_string() {
        let addr = Address::parse(GENESIS).unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{GENESIS}\""));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
        assert!(serde_json::from_str::<Address>("\"rInvalid\"").is_err());
    }
}
