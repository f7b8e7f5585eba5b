//! Proof code redemption.

use chrono::Utc;
use proofcode_common::constants::MIN_SUBMITTED_CODE_LEN;
use proofcode_common::{ProofCodeError, VerifyOutcome};
use serde_json::Value;
use std::sync::Arc;

use super::{CodeStats, require_caller};
use crate::store::CodeStore;

/// Proof code verifier service
pub struct CodeVerifier {
    stats: Arc<CodeStats>,
}

impl CodeVerifier {
    pub fn new(stats: Arc<CodeStats>) -> Self {
        Self { stats }
    }

    /// Redeem `submitted` on behalf of `caller`.
    ///
    /// An unknown or already used code is a normal `success: false` outcome,
    /// not an error. The status check and the update are one store operation,
    /// so concurrent redemptions of the same code succeed at most once.
    pub async fn verify<S: CodeStore>(
        &self,
        store: &S,
        caller: &str,
        submitted: &str,
    ) -> Result<VerifyOutcome, ProofCodeError> {
        let used_by = require_caller(caller)?;
        let code = validate_code(submitted)?;

        match store.consume(code, used_by, Utc::now()).await? {
            Some(record) => {
                self.stats.record_redeemed();
                tracing::info!(
                    code = %record.code,
                    subject_id = %used_by,
                    issued_by = %record.issued_by,
                    "Proof code redeemed"
                );
                Ok(VerifyOutcome::confirmed())
            }
            None => {
                self.stats.record_rejected();
                tracing::debug!(code = %code, subject_id = %used_by, "Proof code rejected");
                Ok(VerifyOutcome::rejected())
            }
        }
    }
}

/// Length is counted in UTF-16 code units, as browser clients count it
fn validate_code(code: &str) -> Result<&str, ProofCodeError> {
    if code.encode_utf16().count() < MIN_SUBMITTED_CODE_LEN {
        return Err(ProofCodeError::InvalidArgument(format!(
            "code must be a string of at least {} characters",
            MIN_SUBMITTED_CODE_LEN
        )));
    }
    Ok(code)
}

/// Extract the `code` field from a verify request body.
///
/// Absent, null, and non-string values are invalid arguments.
pub fn submitted_code(payload: &Value) -> Result<&str, ProofCodeError> {
    payload
        .get("code")
        .and_then(Value::as_str)
        .ok_or_else(|| ProofCodeError::InvalidArgument("code must be a string".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::CodeIssuer;
    use crate::store::MemoryStore;
    use futures::future::join_all;
    use proofcode_common::{CodeStatus, ProofCode};
    use serde_json::json;

    async fn seeded(code: &str) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_if_absent(&ProofCode::new(code.to_string(), "teacher-1".into()))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_verify_redeems_valid_code() {
        let store = seeded("482").await;
        let verifier = CodeVerifier::new(Arc::default());

        let outcome = verifier.verify(&store, "student-1", "482").await.unwrap();
        assert_eq!(outcome, VerifyOutcome::confirmed());

        let record = store.get("482").await.unwrap().unwrap();
        assert_eq!(record.status, CodeStatus::Used);
        assert_eq!(record.used_by.as_deref(), Some("student-1"));
        assert!(record.used_at.is_some());
    }

    #[tokio::test]
    async fn test_second_verify_fails_without_mutation() {
        let store = seeded("7311").await;
        let verifier = CodeVerifier::new(Arc::default());

        assert!(verifier.verify(&store, "student-1", "7311").await.unwrap().success);
        let first = store.get("7311").await.unwrap().unwrap();

        let outcome = verifier.verify(&store, "student-2", "7311").await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "code invalid or already used");

        let second = store.get("7311").await.unwrap().unwrap();
        assert_eq!(second.used_at, first.used_at);
        assert_eq!(second.used_by.as_deref(), Some("student-1"));
    }

    #[tokio::test]
    async fn test_unknown_code_creates_no_record() {
        let store = MemoryStore::new();
        let stats = Arc::new(CodeStats::default());
        let verifier = CodeVerifier::new(stats.clone());

        let outcome = verifier.verify(&store, "student-1", "000").await.unwrap();
        assert!(!outcome.success);
        assert_eq!(store.len().await, 0);
        assert_eq!(stats.snapshot().redemptions_rejected, 1);
    }

    #[tokio::test]
    async fn test_short_codes_are_invalid_arguments() {
        let store = seeded("123").await;
        let verifier = CodeVerifier::new(Arc::default());

        for bad in ["", "1", "12"] {
            let err = verifier.verify(&store, "student-1", bad).await.unwrap_err();
            assert!(matches!(err, ProofCodeError::InvalidArgument(_)), "{:?}", bad);
        }
        assert!(store.get("123").await.unwrap().unwrap().is_valid());
    }

    #[test]
    fn test_length_counts_utf16_units() {
        // One astral-plane character is two UTF-16 units
        assert!(validate_code("\u{1F600}").is_err());
        assert_eq!(validate_code("\u{1F600}1").unwrap(), "\u{1F600}1");
        assert!(validate_code("\u{e9}1").is_err());
    }

    #[tokio::test]
    async fn test_verify_without_caller_touches_nothing() {
        let store = seeded("123").await;
        let verifier = CodeVerifier::new(Arc::default());

        let err = verifier.verify(&store, "", "123").await.unwrap_err();
        assert!(matches!(err, ProofCodeError::Unauthenticated));
        assert!(store.get("123").await.unwrap().unwrap().is_valid());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_redemptions_succeed_once() {
        let store = seeded("90210").await;
        let verifier = Arc::new(CodeVerifier::new(Arc::default()));

        let attempts = (0..32).map(|i| {
            let store = store.clone();
            let verifier = verifier.clone();
            tokio::spawn(async move {
                let caller = format!("student-{}", i);
                verifier.verify(&store, &caller, "90210").await
            })
        });

        let winners = join_all(attempts)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .filter(|outcome| outcome.success)
            .count();
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_issue_then_redeem_scenario() {
        let store = MemoryStore::new();
        let stats = Arc::new(CodeStats::default());
        let issuer = CodeIssuer::new(20, stats.clone());
        let verifier = CodeVerifier::new(stats.clone());

        let issued = issuer.issue(&store, "teacher-1").await.unwrap();
        let first = verifier.verify(&store, "student-1", &issued.code).await.unwrap();
        assert!(first.success);
        assert_eq!(first.message, "confirmation succeeded");

        let again = verifier.verify(&store, "student-1", &issued.code).await.unwrap();
        assert_eq!(again, VerifyOutcome::rejected());

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.codes_issued, 1);
        assert_eq!(snapshot.codes_redeemed, 1);
        assert_eq!(snapshot.redemptions_rejected, 1);
    }

    #[test]
    fn test_submitted_code_requires_string() {
        assert_eq!(submitted_code(&json!({ "code": "482" })).unwrap(), "482");
        for bad in [json!({ "code": 12 }), json!({ "code": null }), json!({}), json!("482")] {
            assert!(matches!(
                submitted_code(&bad),
                Err(ProofCodeError::InvalidArgument(_))
            ));
        }
    }
}
