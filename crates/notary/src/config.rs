//! Configuration management for Notary.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use proofcode_common::constants::{
    DEFAULT_LISTEN_ADDR, DEFAULT_MAX_ISSUE_ATTEMPTS, DEFAULT_REDIS_URL,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Record store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Redis (durable, shared across nodes)
    Redis,
    /// In-process map (development only)
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Redis => "redis",
            Self::Memory => "memory",
        }
    }
}

impl Default for StoreBackend {
    fn default() -> Self {
        Self::Redis
    }
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Record store backend
    #[serde(default)]
    pub store: StoreBackend,

    /// This node's unique ID (auto-generated if not set)
    #[serde(default = "generate_node_id")]
    pub node_id: String,

    /// Issuance configuration
    #[serde(default)]
    pub issuer: IssuerConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpConfig,
}

/// Issuance-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IssuerConfig {
    /// Generate-and-insert attempts before issuance fails
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Allow cross-origin calls from any browser origin
    #[serde(default)]
    pub cors_permissive: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            cors_permissive: false,
        }
    }
}

// Default value functions
fn default_redis_url() -> String { DEFAULT_REDIS_URL.to_string() }
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_max_attempts() -> u32 { DEFAULT_MAX_ISSUE_ATTEMPTS }
fn default_request_timeout() -> u64 { DEFAULT_REQUEST_TIMEOUT_SECS }

fn generate_node_id() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    format!("node-{:08x}", rng.random::<u32>())
}

impl AppConfig {
    /// Load configuration from file, with CLI overrides
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let settings = config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .build()
                .context("Failed to load config file")?;

            settings
                .try_deserialize()
                .context("Failed to parse config")?
        } else {
            // Use defaults if config file doesn't exist
            tracing::warn!("Config file not found, using defaults");
            Self::default()
        };

        // Apply CLI overrides
        if let Some(ref redis_url) = args.redis_url {
            config.redis_url = redis_url.clone();
        }
        if let Some(ref listen) = args.listen {
            config.listen_addr = listen.clone();
        }
        if let Some(store) = args.store {
            config.store = store;
        }

        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            redis_url: default_redis_url(),
            listen_addr: default_listen_addr(),
            store: StoreBackend::default(),
            node_id: generate_node_id(),
            issuer: IssuerConfig::default(),
            http: HttpConfig::default(),
        }
    }
}
