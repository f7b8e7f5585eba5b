//! # Proofcode Common
//!
//! Shared types, errors, and constants used across proof code components.
//!
//! ## Modules
//! - `types` - Core data structures (ProofCode, CodeStatus, VerifyOutcome)
//! - `error` - Common error types
//! - `constants` - Shared configuration constants

pub mod constants;
pub mod error;
pub mod types;

pub use error::ProofCodeError;
pub use types::*;
