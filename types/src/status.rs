//! Query results for accounts and trustlines.
//!
//! These are recomputed on every call and never cached.

use serde::{Deserialize, Serialize};

/// Existence and XRP balance of an account at the validated ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatus {
    pub exists: bool,
    /// XRP balance as a decimal string.
    pub balance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
}

impl AccountStatus {
    /// The status of an address with no ledger entry.
    pub fn missing() -> Self {
        Self {
            exists: false,
            balance: "0".into(),
            sequence: None,
        }
    }
}

/// A single trustline between an account and an issuer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustlineStatus {
    pub has_trustline: bool,
    pub balance: String,
    pub limit: String,
}

impl TrustlineStatus {
    pub fn absent() -> Self {
        Self {
            has_trustline: false,
            balance: "0".into(),
            limit: "0".into(),
        }
    }
}

/// Account status plus the trustline that was asked about, if any.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountReport {
    pub account: AccountStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trustline: Option<TrustlineStatus>,
}

impl AccountReport {
    /// Trustline status, treating "not requested" as absent.
    pub fn trustline_or_absent(&self) -> TrustlineStatus {
        self.trustline.clone().unwrap_or_else(TrustlineStatus::absent)
    }
}
