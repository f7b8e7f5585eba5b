//! In-process record store for development and tests.

use chrono::{DateTime, Utc};
use proofcode_common::{ProofCode, ProofCodeError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::CodeStore;

/// Records keyed by code, guarded by a single lock so each operation is atomic
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<String, ProofCode>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

impl CodeStore for MemoryStore {
    async fn insert_if_absent(&self, record: &ProofCode) -> Result<bool, ProofCodeError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.code) {
            return Ok(false);
        }
        records.insert(record.code.clone(), record.clone());
        Ok(true)
    }

    async fn consume(
        &self,
        code: &str,
        used_by: &str,
        used_at: DateTime<Utc>,
    ) -> Result<Option<ProofCode>, ProofCodeError> {
        let mut records = self.records.write().await;
        match records.get_mut(code) {
            Some(record) => Ok(record.redeem(used_by, used_at).then(|| record.clone())),
            None => Ok(None),
        }
    }

    async fn get(&self, code: &str) -> Result<Option<ProofCode>, ProofCodeError> {
        Ok(self.records.read().await.get(code).cloned())
    }

    async fn ping(&self) -> bool {
        true
    }
}
