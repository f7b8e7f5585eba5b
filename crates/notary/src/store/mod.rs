//! Proof code record storage.
//!
//! Both operations the core depends on are single atomic store calls:
//! - `insert_if_absent` creates a record only if no record with that code exists
//! - `consume` flips a record from `valid` to `used` only if it is still `valid`

mod memory;
mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use anyhow::Result;
use chrono::{DateTime, Utc};
use proofcode_common::{ProofCode, ProofCodeError};
use std::future::Future;

use crate::config::{AppConfig, StoreBackend};

/// Storage operations used by the issuer and verifier
pub trait CodeStore: Send + Sync {
    /// Persist `record` unless a record with the same code already exists.
    ///
    /// Returns true if the record was written.
    fn insert_if_absent(
        &self,
        record: &ProofCode,
    ) -> impl Future<Output = Result<bool, ProofCodeError>> + Send;

    /// Transition the record for `code` from `valid` to `used`.
    ///
    /// Returns the updated record, or `None` if no `valid` record matched.
    fn consume(
        &self,
        code: &str,
        used_by: &str,
        used_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<ProofCode>, ProofCodeError>> + Send;

    /// Read a record regardless of status
    fn get(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<Option<ProofCode>, ProofCodeError>> + Send;

    /// Is the backend reachable?
    fn ping(&self) -> impl Future<Output = bool> + Send;
}

/// Store selected at startup
#[derive(Clone)]
pub enum Store {
    Redis(RedisStore),
    Memory(MemoryStore),
}

impl Store {
    /// Construct the configured backend, connecting to Redis if needed
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        match config.store {
            StoreBackend::Redis => Ok(Self::Redis(RedisStore::connect(&config.redis_url).await?)),
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; records are lost on restart");
                Ok(Self::Memory(MemoryStore::new()))
            }
        }
    }

    pub fn backend(&self) -> StoreBackend {
        match self {
            Self::Redis(_) => StoreBackend::Redis,
            Self::Memory(_) => StoreBackend::Memory,
        }
    }
}

impl CodeStore for Store {
    async fn insert_if_absent(&self, record: &ProofCode) -> Result<bool, ProofCodeError> {
        match self {
            Self::Redis(store) => store.insert_if_absent(record).await,
            Self::Memory(store) => store.insert_if_absent(record).await,
        }
    }

    async fn consume(
        &self,
        code: &str,
        used_by: &str,
        used_at: DateTime<Utc>,
    ) -> Result<Option<ProofCode>, ProofCodeError> {
        match self {
            Self::Redis(store) => store.consume(code, used_by, used_at).await,
            Self::Memory(store) => store.consume(code, used_by, used_at).await,
        }
    }

    async fn get(&self, code: &str) -> Result<Option<ProofCode>, ProofCodeError> {
        match self {
            Self::Redis(store) => store.get(code).await,
            Self::Memory(store) => store.get(code).await,
        }
    }

    async fn ping(&self) -> bool {
        match self {
            Self::Redis(store) => store.ping().await,
            Self::Memory(store) => store.ping().await,
        }
    }
}
