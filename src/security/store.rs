//! Shared counter storage for the sliding-window limiter.
//!
//! # Responsibilities
//! - Count one event against a keyed sliding window, atomically
//! - Report whether the event fit the budget and when the window frees up
//!
//! # Design Decisions
//! - Redis variant keeps a sorted set of event timestamps per key and runs
//!   prune/count/record as one Lua script, so concurrent callers from
//!   different process instances share a single source of truth
//! - Memory variant mirrors the same semantics for single-process
//!   deployments and tests
//! - The store never caches counts between calls

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::Script;
use thiserror::Error;
use uuid::Uuid;

use crate::security::rate_limit::RateDecision;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("counter store error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("counter store timed out")]
    Timeout,
    #[error("unexpected counter store reply")]
    Protocol,
}

/// Prunes expired events, then either records the new one and returns the
/// remaining budget, or reports when the oldest surviving event expires.
///
/// Reply: `{allowed, remaining, reset_at_ms}`.
const SLIDING_WINDOW_SCRIPT: &str = r#"
local key = KEYS[1]
local now = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local limit = tonumber(ARGV[3])
redis.call("ZREMRANGEBYSCORE", key, 0, now - window)
local count = redis.call("ZCARD", key)
if count >= limit then
    local oldest = redis.call("ZRANGE", key, 0, 0, "WITHSCORES")
    return {0, 0, tonumber(oldest[2]) + window}
end
redis.call("ZADD", key, now, ARGV[4])
redis.call("PEXPIRE", key, window)
return {1, limit - count - 1, now + window}
"#;

/// Counter store backed by a shared Redis instance.
#[derive(Clone)]
pub struct RedisCounterStore {
    conn: ConnectionManager,
    script: Arc<Script>,
}

impl RedisCounterStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self {
            conn,
            script: Arc::new(Script::new(SLIDING_WINDOW_SCRIPT)),
        })
    }

    async fn hit(
        &self,
        key: &str,
        limit: u32,
        window_ms: u64,
        now_ms: u64,
    ) -> Result<RateDecision, StoreError> {
        let mut conn = self.conn.clone();
        // Sorted-set members must be unique even when two events share a
        // millisecond timestamp.
        let member = format!("{now_ms}:{}", Uuid::new_v4().simple());
        let reply: Vec<i64> = self
            .script
            .key(key)
            .arg(now_ms)
            .arg(window_ms)
            .arg(limit)
            .arg(member)
            .invoke_async(&mut conn)
            .await?;
        decision_from_reply(&reply)
    }
}

fn decision_from_reply(reply: &[i64]) -> Result<RateDecision, StoreError> {
    match reply {
        [allowed, remaining, reset_at_ms] => Ok(RateDecision {
            allowed: *allowed == 1,
            remaining: (*remaining).max(0) as u32,
            reset_at_ms: (*reset_at_ms).max(0) as u64,
        }),
        _ => Err(StoreError::Protocol),
    }
}

/// Counter store for single-process deployments and tests.
///
/// Keeps the full sliding log of event timestamps per key, matching the
/// Redis variant's semantics exactly.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    keys: Mutex<HashMap<String, KeyLog>>,
}

/// Event log for one key, remembering the window it was last hit with so
/// the sweep can prune it without a new hit on that key.
#[derive(Debug)]
struct KeyLog {
    window_ms: u64,
    events: Vec<u64>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(
        &self,
        key: &str,
        limit: u32,
        window_ms: u64,
        now_ms: u64,
    ) -> Result<RateDecision, StoreError> {
        let mut keys = self.keys.lock().expect("counter store mutex poisoned");
        // The Redis variant lets PEXPIRE reclaim idle keys; here every hit
        // sweeps fully-expired keys so one-shot subjects do not accumulate.
        keys.retain(|_, log| {
            log.events.retain(|&ts| ts + log.window_ms > now_ms);
            !log.events.is_empty()
        });

        let log = keys.entry(key.to_string()).or_insert_with(|| KeyLog {
            window_ms,
            events: Vec::new(),
        });
        log.window_ms = window_ms;

        if (log.events.len() as u32) < limit {
            log.events.push(now_ms);
            Ok(RateDecision {
                allowed: true,
                remaining: limit - log.events.len() as u32,
                reset_at_ms: now_ms + window_ms,
            })
        } else {
            let oldest = log.events.first().copied().unwrap_or(now_ms);
            Ok(RateDecision {
                allowed: false,
                remaining: 0,
                reset_at_ms: oldest + window_ms,
            })
        }
    }
}

/// The configured counter backend.
pub enum CounterStore {
    Redis(RedisCounterStore),
    Memory(InMemoryCounterStore),
}

impl CounterStore {
    pub fn memory() -> Self {
        CounterStore::Memory(InMemoryCounterStore::new())
    }

    /// Counts one event at `now_ms` against `key`'s window.
    pub async fn hit(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
        now_ms: u64,
    ) -> Result<RateDecision, StoreError> {
        let window_ms = window.as_millis() as u64;
        match self {
            CounterStore::Redis(store) => store.hit(key, limit, window_ms, now_ms).await,
            CounterStore::Memory(store) => store.hit(key, limit, window_ms, now_ms),
        }
    }
}
