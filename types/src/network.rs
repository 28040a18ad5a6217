//! Ledger network identifier.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ValidationError;

/// Which public XRP Ledger network to talk to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Devnet,
}

impl Network {
    /// Public servers tried in order when no endpoints are configured.
    pub fn default_endpoints(&self) -> &'static [&'static str] {
        match self {
            Self::Mainnet => &[
                "wss://xrplcluster.com",
                "wss://s1.ripple.com",
                "wss://s2.ripple.com",
            ],
            Self::Testnet => &["wss://s.altnet.rippletest.net:51233"],
            Self::Devnet => &["wss://s.devnet.rippletest.net:51233"],
        }
    }

    /// Base URL of the public explorer for this network.
    pub fn explorer_base(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://livenet.xrpl.org",
            Self::Testnet => "https://testnet.xrpl.org",
            Self::Devnet => "https://devnet.xrpl.org",
        }
    }

    pub fn transaction_url(&self, hash: &str) -> String {
        format!("{}/transactions/{hash}", self.explorer_base())
    }

    pub fn account_url(&self, address: &str) -> String {
        format!("{}/accounts/{address}", self.explorer_base())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Devnet => "devnet",
        }
    }
}

impl FromStr for Network {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" | "live" => Ok(Self::Mainnet),
            "testnet" | "test" => Ok(Self::Testnet),
            "devnet" | "dev" => Ok(Self::Devnet),
            _ => Err(ValidationError::InvalidNetwork(s.to_string())),
        }
    }
}
