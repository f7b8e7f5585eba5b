//! Common error types for proof code components.

use thiserror::Error;

/// Errors surfaced by the issuer, the verifier and the record store
#[derive(Debug, Error)]
pub enum ProofCodeError {
    /// No verified caller identity was attached to the request
    #[error("The function must be called while authenticated")]
    Unauthenticated,

    /// Malformed input (submitted code absent, not a string, or too short)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Record lookup found nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Store connection/operation error
    #[error("Store error: {0}")]
    Store(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProofCodeError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::InvalidArgument(_) => 400,
            Self::NotFound(_) => 404,
            Self::Store(_) => 503,
            Self::Internal(_) => 500,
        }
    }

    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Store(_) => "STORE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Returns true if this error should be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}
