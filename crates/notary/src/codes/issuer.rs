//! Proof code issuance.

use proofcode_common::constants::CODE_LENGTHS;
use proofcode_common::{IssuedCode, ProofCode, ProofCodeError};
use rand::Rng;
use std::sync::Arc;

use super::{CodeStats, require_caller};
use crate::store::CodeStore;

/// Proof code issuer service
pub struct CodeIssuer {
    /// Generate-and-insert attempts before giving up
    pub max_attempts: u32,
    stats: Arc<CodeStats>,
}

impl CodeIssuer {
    pub fn new(max_attempts: u32, stats: Arc<CodeStats>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            stats,
        }
    }

    /// Mint a code no existing record uses and persist it as `valid`.
    ///
    /// Each attempt draws a candidate and tries a conditional insert; an
    /// existing record with the same code (any status) discards the candidate.
    pub async fn issue<S: CodeStore>(
        &self,
        store: &S,
        caller: &str,
    ) -> Result<IssuedCode, ProofCodeError> {
        let issued_by = require_caller(caller)?;

        for attempt in 1..=self.max_attempts {
            let candidate = draw_candidate(&mut rand::rng());
            let record = ProofCode::new(candidate, issued_by.to_string());

            if store.insert_if_absent(&record).await? {
                self.stats.record_issued();
                tracing::info!(
                    code = %record.code,
                    subject_id = %issued_by,
                    attempts = attempt,
                    "Proof code issued"
                );
                return Ok(IssuedCode { code: record.code });
            }

            self.stats.record_collision();
            tracing::debug!(code = %record.code, attempt, "Proof code collision, retrying");
        }

        tracing::error!(
            subject_id = %issued_by,
            attempts = self.max_attempts,
            "Proof code space exhausted"
        );
        Err(ProofCodeError::Internal(format!(
            "no unique proof code after {} attempts",
            self.max_attempts
        )))
    }
}

/// Draw a candidate code: a length from {3, 4, 5}, then a value in
/// `[10^(len-1), 10^len)` so the first digit is never zero.
pub fn draw_candidate<R: Rng>(rng: &mut R) -> String {
    let length = CODE_LENGTHS[rng.random_range(0..CODE_LENGTHS.len())];
    let min = 10u32.pow(length - 1);
    let max = 10u32.pow(length);
    rng.random_range(min..max).to_string()
}
