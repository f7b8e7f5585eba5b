//! Shared constants for proof code components.

/// Default Redis connection URL
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Default Notary HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8890";

/// Maximum generate-and-insert attempts per issuance
pub const DEFAULT_MAX_ISSUE_ATTEMPTS: u32 = 20;

/// Per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Digit lengths an issued code may have (drawn uniformly)
pub const CODE_LENGTHS: [u32; 3] = [3, 4, 5];

/// Shortest submission the verifier will look up
pub const MIN_SUBMITTED_CODE_LEN: usize = 3;

/// Message returned when a code was redeemed
pub const MSG_CONFIRMED: &str = "confirmation succeeded";

/// Message returned when no valid record matched
pub const MSG_INVALID_OR_USED: &str = "code invalid or already used";

/// Redis key prefixes
pub mod redis_keys {
    /// Proof code record (hash): proofcode:{code}
    pub const PROOF_CODE_PREFIX: &str = "proofcode:";
}

/// HTTP header names
pub mod headers {
    /// Verified caller identity (injected by the identity gateway)
    pub const X_SUBJECT_ID: &str = "X-Subject-Id";
}
