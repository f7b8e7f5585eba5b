//! Application state and shared resources.

use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;

use crate::codes::{CodeIssuer, CodeStats, CodeVerifier};
use crate::config::AppConfig;
use crate::store::Store;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Proof code record store
    pub store: Store,

    /// Node identifier
    pub node_id: String,

    /// Proof code issuer
    pub issuer: Arc<CodeIssuer>,

    /// Proof code verifier
    pub verifier: Arc<CodeVerifier>,

    /// Issue/redeem counters
    pub stats: Arc<CodeStats>,

    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Create new application state, connecting to the configured store
    pub async fn new(config: AppConfig) -> Result<Self> {
        let store = Store::connect(&config).await?;
        Ok(Self::with_store(config, store))
    }

    /// Create application state around an already constructed store
    pub fn with_store(config: AppConfig, store: Store) -> Self {
        let node_id = config.node_id.clone();
        let stats = Arc::new(CodeStats::default());

        let issuer = Arc::new(CodeIssuer::new(config.issuer.max_attempts, stats.clone()));
        let verifier = Arc::new(CodeVerifier::new(stats.clone()));

        Self {
            config,
            store,
            node_id,
            issuer,
            verifier,
            stats,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
