//! Cache-aside helpers shared by every cached read and every write that invalidates.

use super::{CachePolicy, CacheTier, FailurePolicy};
use crate::errors::{Error, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;
use tracing::{debug, warn};

/// Reads `key` from the cache, falling through to `load` on a miss.
///
/// A value produced by `load` is written back with `policy.ttl`. A backend error on the
/// read is always fatal; decode and write-back failures follow `policy`. When `load`
/// fails nothing is written.
pub async fn read_through<C, T, F, Fut>(
    cache: &C,
    key: &str,
    policy: &CachePolicy,
    load: F,
) -> Result<T>
where
    C: CacheTier,
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match cache.get(key).await? {
        Some(bytes) => match serde_json::from_slice::<T>(&bytes) {
            Ok(value) => {
                debug!(key, "cache hit");
                return Ok(value);
            }
            Err(source) => match policy.decode_failure {
                FailurePolicy::Fail => {
                    return Err(Error::Decode {
                        key: key.to_string(),
                        source,
                    });
                }
                FailurePolicy::Ignore => {
                    warn!(key, error = %source, "undecodable cache entry, reading from store");
                }
            },
        },
        None => debug!(key, "cache miss"),
    }

    let value = load().await?;
    write_back(cache, key, &value, policy).await?;
    Ok(value)
}

/// Serializes `value` and stores it under `key`, applying `policy.write_failure`.
pub async fn write_back<C, T>(cache: &C, key: &str, value: &T, policy: &CachePolicy) -> Result<()>
where
    C: CacheTier,
    T: Serialize,
{
    let result = match serde_json::to_vec(value) {
        Ok(bytes) => cache.set(key, bytes, policy.ttl).await.map_err(Error::from),
        Err(e) => Err(Error::Encode(e)),
    };

    match (result, policy.write_failure) {
        (Ok(()), _) => Ok(()),
        (Err(e), FailurePolicy::Fail) => Err(e),
        (Err(e), FailurePolicy::Ignore) => {
            warn!(key, error = %e, "cache write-back failed, returning store result");
            Ok(())
        }
    }
}

/// Removes every key in `keys`. Failures are logged and otherwise ignored, since an
/// entry that survives eviction still expires with its TTL.
pub async fn evict<C, I, K>(cache: &C, keys: I)
where
    C: CacheTier,
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    for key in keys {
        let key = key.as_ref();
        match cache.delete(key).await {
            Ok(()) => debug!(key, "evicted cache entry"),
            Err(e) => warn!(key, error = %e, "cache eviction failed"),
        }
    }
}
