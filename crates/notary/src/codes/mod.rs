//! Proof code issuance and redemption.
//!
//! The issuer mints a numeric code that no existing record uses and stores
//! it as `valid`. The verifier flips a `valid` record to `used` exactly once.

mod issuer;
mod verifier;

pub use issuer::CodeIssuer;
pub use verifier::{CodeVerifier, submitted_code};

use proofcode_common::{MetricsSnapshot, ProofCodeError};
use std::sync::atomic::{AtomicU64, Ordering};

/// Reject empty caller identities before any store access
fn require_caller(caller: &str) -> Result<&str, ProofCodeError> {
    let subject = caller.trim();
    if subject.is_empty() {
        return Err(ProofCodeError::Unauthenticated);
    }
    Ok(subject)
}

/// In-process counters shared by the issuer and verifier
#[derive(Debug, Default)]
pub struct CodeStats {
    issued: AtomicU64,
    redeemed: AtomicU64,
    rejected: AtomicU64,
    collisions: AtomicU64,
}

impl CodeStats {
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            codes_issued: self.issued.load(Ordering::Relaxed),
            codes_redeemed: self.redeemed.load(Ordering::Relaxed),
            redemptions_rejected: self.rejected.load(Ordering::Relaxed),
            issue_collisions: self.collisions.load(Ordering::Relaxed),
        }
    }

    fn record_issued(&self) {
        self.issued.fetch_add(1, Ordering::Relaxed);
    }

    fn record_redeemed(&self) {
        self.redeemed.fetch_add(1, Ordering::Relaxed);
    }

    fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    fn record_collision(&self) {
        self.collisions.fetch_add(1, Ordering::Relaxed);
    }
}
