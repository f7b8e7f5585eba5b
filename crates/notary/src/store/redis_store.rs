//! Redis-backed record store.
//!
//! Each record is a hash at `proofcode:{code}`. Keying by code makes the
//! uniqueness check and the insert one Lua script, and the status check and
//! the redemption another; Redis runs each script atomically.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use proofcode_common::constants::redis_keys::PROOF_CODE_PREFIX;
use proofcode_common::{CodeStatus, ProofCode, ProofCodeError};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use std::collections::HashMap;

use super::CodeStore;

const INSERT_IF_ABSENT: &str = r"
if redis.call('EXISTS', KEYS[1]) == 1 then
    return 0
end
redis.call('HSET', KEYS[1], unpack(ARGV))
return 1
";

const CONSUME_IF_VALID: &str = r"
if redis.call('HGET', KEYS[1], 'status') ~= 'valid' then
    return {}
end
redis.call('HSET', KEYS[1], 'status', 'used', 'used_at', ARGV[1], 'used_by', ARGV[2])
return redis.call('HGETALL', KEYS[1])
";

/// Proof code store on a shared, auto-reconnecting Redis connection
#[derive(Clone)]
pub struct RedisStore {
    redis: ConnectionManager,
    insert_script: Script,
    consume_script: Script,
}

impl RedisStore {
    /// Connect to Redis with connection manager (handles reconnection)
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;

        let redis = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        Ok(Self {
            redis,
            insert_script: Script::new(INSERT_IF_ABSENT),
            consume_script: Script::new(CONSUME_IF_VALID),
        })
    }
}

fn record_key(code: &str) -> String {
    format!("{}{}", PROOF_CODE_PREFIX, code)
}

fn store_err(err: redis::RedisError) -> ProofCodeError {
    ProofCodeError::Store(err.to_string())
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(code: &str, field: &str, value: &str) -> Result<DateTime<Utc>, ProofCodeError> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| {
            ProofCodeError::Internal(format!("record {} has malformed {}: {}", code, field, e))
        })
}

/// Flatten a record into hash field/value pairs; null fields are omitted
fn record_to_fields(record: &ProofCode) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("code", record.code.clone()),
        ("status", record.status.as_str().to_string()),
        ("issued_at", format_timestamp(record.issued_at)),
        ("issued_by", record.issued_by.clone()),
    ];
    if let Some(used_at) = record.used_at {
        fields.push(("used_at", format_timestamp(used_at)));
    }
    if let Some(ref used_by) = record.used_by {
        fields.push(("used_by", used_by.clone()));
    }
    fields
}

/// Rebuild a record from a hash; an empty hash means the key does not exist
fn record_from_fields(
    mut fields: HashMap<String, String>,
) -> Result<Option<ProofCode>, ProofCodeError> {
    if fields.is_empty() {
        return Ok(None);
    }

    let code = fields
        .remove("code")
        .ok_or_else(|| ProofCodeError::Internal("record is missing its code".to_string()))?;

    let mut required = |field: &str| {
        fields.remove(field).ok_or_else(|| {
            ProofCodeError::Internal(format!("record {} is missing {}", code, field))
        })
    };

    let status_raw = required("status")?;
    let issued_at_raw = required("issued_at")?;
    let issued_by = required("issued_by")?;

    let status = CodeStatus::parse(&status_raw).ok_or_else(|| {
        ProofCodeError::Internal(format!("record {} has unknown status {}", code, status_raw))
    })?;
    let issued_at = parse_timestamp(&code, "issued_at", &issued_at_raw)?;
    let used_at = fields
        .remove("used_at")
        .map(|raw| parse_timestamp(&code, "used_at", &raw))
        .transpose()?;
    let used_by = fields.remove("used_by");

    Ok(Some(ProofCode {
        code,
        status,
        issued_at,
        issued_by,
        used_at,
        used_by,
    }))
}

impl CodeStore for RedisStore {
    async fn insert_if_absent(&self, record: &ProofCode) -> Result<bool, ProofCodeError> {
        let mut conn = self.redis.clone();

        let mut invocation = self.insert_script.prepare_invoke();
        invocation.key(record_key(&record.code));
        for (field, value) in record_to_fields(record) {
            invocation.arg(field).arg(value);
        }

        let inserted: i64 = invocation.invoke_async(&mut conn).await.map_err(store_err)?;
        Ok(inserted == 1)
    }

    async fn consume(
        &self,
        code: &str,
        used_by: &str,
        used_at: DateTime<Utc>,
    ) -> Result<Option<ProofCode>, ProofCodeError> {
        let mut conn = self.redis.clone();

        let fields: HashMap<String, String> = self
            .consume_script
            .key(record_key(code))
            .arg(format_timestamp(used_at))
            .arg(used_by)
            .invoke_async(&mut conn)
            .await
            .map_err(store_err)?;

        record_from_fields(fields)
    }

    async fn get(&self, code: &str) -> Result<Option<ProofCode>, ProofCodeError> {
        let mut conn = self.redis.clone();
        let fields: HashMap<String, String> =
            conn.hgetall(record_key(code)).await.map_err(store_err)?;
        record_from_fields(fields)
    }

    async fn ping(&self) -> bool {
        let mut conn = self.redis.clone();
        let result: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        result.is_ok()
    }
}
