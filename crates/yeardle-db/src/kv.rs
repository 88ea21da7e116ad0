//! Key-value store abstraction with TTL.
//!
//! The ephemeral session store is written against this trait rather than a
//! process-wide cache singleton, so tests can substitute [`MemoryStore`]
//! and production injects [`CachePool`].
//!
//! [`MemoryStore`]: crate::memory::MemoryStore
//! [`CachePool`]: crate::cache::CachePool

use std::time::Duration;

use crate::error::DbError;

/// A string-keyed store where every write carries a time-to-live.
///
/// Writes fully overwrite the prior value; there is no merge and no
/// compare-and-set. Reads of an expired or absent key return `None`.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    /// Read the value at `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, DbError>;

    /// Write `value` at `key`, replacing any prior value and resetting the
    /// expiry to `ttl` from now.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DbError>;

    /// Delete the value at `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), DbError>;
}
