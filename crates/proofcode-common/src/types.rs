//! Core types shared across proof code components.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MSG_CONFIRMED, MSG_INVALID_OR_USED};

/// Lifecycle state of a proof code.
///
/// `Valid` moves to `Used` exactly once; `Used` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeStatus {
    /// Issued, not yet redeemed
    Valid,
    /// Redeemed
    Used,
}

impl CodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Used => "used",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "valid" => Some(Self::Valid),
            "used" => Some(Self::Used),
            _ => None,
        }
    }
}

/// A persisted proof code record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofCode {
    /// 3-5 decimal digits, first digit nonzero
    pub code: String,

    /// Current status
    pub status: CodeStatus,

    /// Server time of issuance
    pub issued_at: DateTime<Utc>,

    /// Subject that issued the code
    pub issued_by: String,

    /// Server time of redemption
    pub used_at: Option<DateTime<Utc>>,

    /// Subject that redeemed the code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_by: Option<String>,
}

impl ProofCode {
    /// Create a fresh `valid` record issued by `issued_by` now
    pub fn new(code: String, issued_by: String) -> Self {
        Self {
            code,
            status: CodeStatus::Valid,
            issued_at: Utc::now(),
            issued_by,
            used_at: None,
            used_by: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status == CodeStatus::Valid
    }

    /// Apply the `valid -> used` transition.
    ///
    /// Returns false and leaves the record untouched if it was already used.
    pub fn redeem(&mut self, used_by: &str, at: DateTime<Utc>) -> bool {
        if !self.is_valid() {
            return false;
        }
        self.status = CodeStatus::Used;
        self.used_at = Some(at);
        self.used_by = Some(used_by.to_string());
        true
    }
}

/// Issuance response sent to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedCode {
    pub code: String,
}

/// Verification result sent to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOutcome {
    pub success: bool,
    pub message: String,
}

impl VerifyOutcome {
    pub fn confirmed() -> Self {
        Self {
            success: true,
            message: MSG_CONFIRMED.to_string(),
        }
    }

    pub fn rejected() -> Self {
        Self {
            success: false,
            message: MSG_INVALID_OR_USED.to_string(),
        }
    }
}

/// Metrics snapshot for monitoring
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Codes persisted by the issuer
    pub codes_issued: u64,

    /// Successful `valid -> used` transitions
    pub codes_redeemed: u64,

    /// Verifications that matched no valid record
    pub redemptions_rejected: u64,

    /// Candidates discarded because the code already existed
    pub issue_collisions: u64,
}
