//! Cache tier - Time-bounded, non-authoritative copies of store data.
//!
//! The store owns every record; the cache only holds serialized snapshots keyed by
//! computer id or employee abbreviation, and can be dropped at any time without data
//! loss. Backends implement [`CacheTier`], which distinguishes a miss (`Ok(None)`)
//! from a backend failure (`Err`). The read-through and eviction helpers in [`aside`]
//! apply a [`CachePolicy`] to decide which failures are fatal.
//!
//! [`MemoryCache`] keeps entries inside the process; [`RedisCache`] shares them through
//! a Redis server. [`CacheBackend`] picks one from settings at startup.

pub mod aside;
pub mod memory;
pub mod redis_cache;

pub use aside::{evict, read_through};
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

use crate::config::settings::{CacheBackendKind, CacheSettings};
use serde::{Deserialize, Deserializer};
use std::{future::Future, time::Duration};
use thiserror::Error;

/// Cache key for a single computer record.
#[must_use]
pub fn computer_key(id: i64) -> String {
    format!("computer:{id}")
}

/// Cache key for the list of computers owned by an employee.
#[must_use]
pub fn employee_computers_key(abbreviation: &str) -> String {
    format!("computers_by_employee_{abbreviation}")
}

/// Failure reported by a cache backend. A miss is not an error.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend could not be reached or rejected the command
    #[error("cache backend error: {message}")]
    Backend { message: String },
}

/// Key-value store with per-entry expiry.
///
/// All methods return `Send` futures so a backend can be shared across tokio tasks.
pub trait CacheTier: Send + Sync {
    /// Returns the stored bytes, or `None` when the key is absent or expired.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, CacheError>> + Send;

    /// Stores `value` under `key`, replacing any previous entry, for `ttl`.
    fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), CacheError>> + Send;

    /// Removes `key`. Removing an absent key succeeds.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), CacheError>> + Send;
}

/// The cache tier chosen by [`CacheSettings`].
#[derive(Debug, Clone)]
pub enum CacheBackend {
    /// Per-process map
    Memory(MemoryCache),
    /// Shared Redis server
    Redis(RedisCache),
}

impl CacheBackend {
    /// Builds the configured backend, connecting to Redis when selected.
    pub async fn connect(settings: &CacheSettings) -> Result<Self, CacheError> {
        match settings.backend {
            CacheBackendKind::Memory => Ok(Self::Memory(MemoryCache::new())),
            CacheBackendKind::Redis => RedisCache::connect(&settings.redis_url)
                .await
                .map(Self::Redis),
        }
    }
}

impl CacheTier for CacheBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        match self {
            Self::Memory(cache) => cache.get(key).await,
            Self::Redis(cache) => cache.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        match self {
            Self::Memory(cache) => cache.set(key, value, ttl).await,
            Self::Redis(cache) => cache.set(key, value, ttl).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        match self {
            Self::Memory(cache) => cache.delete(key).await,
            Self::Redis(cache) => cache.delete(key).await,
        }
    }
}

/// What to do when a cache step fails after the store has produced (or could produce)
/// a valid result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Surface the failure to the caller
    Fail,
    /// Log it and carry on as if the cache were absent
    #[default]
    Ignore,
}

/// Per-operation caching behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CachePolicy {
    /// How long a written entry stays fresh
    #[serde(rename = "ttl_secs", deserialize_with = "duration_from_secs")]
    pub ttl: Duration,
    /// Whether a failed write-back fails the read that triggered it
    #[serde(default)]
    pub write_failure: FailurePolicy,
    /// Whether an undecodable entry is an error or a miss
    #[serde(default)]
    pub decode_failure: FailurePolicy,
}

impl CachePolicy {
    /// Lenient policy with the given TTL.
    #[must_use]
    pub const fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            write_failure: FailurePolicy::Ignore,
            decode_failure: FailurePolicy::Ignore,
        }
    }

    /// Policy that surfaces every cache failure.
    #[must_use]
    pub const fn strict(ttl: Duration) -> Self {
        Self {
            ttl,
            write_failure: FailurePolicy::Fail,
            decode_failure: FailurePolicy::Fail,
        }
    }
}

fn duration_from_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}
