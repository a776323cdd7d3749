//! Redis cache backend.
//!
//! Cached records are shared by every process pointed at the same server. A `GET` on
//! an absent or expired key answers `nil`, which decodes to a miss; every other reply
//! or transport failure is a [`CacheError::Backend`].

use super::{CacheError, CacheTier};
use redis::{
    AsyncCommands, Client, RedisError,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use std::{fmt, time::Duration};
use tracing::info;

/// Cache tier backed by a Redis server.
///
/// Clones share one multiplexed connection that reconnects on its own.
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
    url: String,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(2);
const RECONNECT_RETRIES: usize = 2;

impl RedisCache {
    /// Connects to the server at `url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = Client::open(url).map_err(backend)?;
        let config = ConnectionManagerConfig::new()
            .set_connection_timeout(CONNECT_TIMEOUT)
            .set_response_timeout(RESPONSE_TIMEOUT)
            .set_number_of_retries(RECONNECT_RETRIES);
        let manager = ConnectionManager::new_with_config(client, config)
            .await
            .map_err(backend)?;
        info!("Connected to Redis at {}", url);
        Ok(Self {
            manager,
            url: url.to_string(),
        })
    }
}

fn backend(err: RedisError) -> CacheError {
    CacheError::Backend {
        message: err.to_string(),
    }
}

/// Redis expiry in milliseconds; `PSETEX` rejects zero.
fn expiry_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

impl CacheTier for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.manager.clone();
        conn.get(key).await.map_err(backend)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        conn.pset_ex(key, value, expiry_millis(ttl))
            .await
            .map_err(backend)
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        conn.del(key).await.map_err(backend)
    }
}
