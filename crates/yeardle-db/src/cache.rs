//! Redis-compatible cache operations.
//!
//! The cache holds one slot per anonymous token, expiring 24 hours after
//! the last write. Any Redis-protocol server works (Redis, Dragonfly,
//! Valkey).

use std::time::Duration;

use fred::prelude::*;
use fred::types::Expiration;

use crate::error::DbError;
use crate::kv::KeyValueStore;

/// Connection handle to a Redis-compatible cache.
///
/// Wraps a [`fred::prelude::Client`] and implements [`KeyValueStore`] for
/// the ephemeral session store.
#[derive(Clone)]
pub struct CachePool {
    client: Client,
}

impl CachePool {
    /// Connect to the cache at the given URL.
    ///
    /// The URL follows the Redis URL scheme: `redis://host:port` or
    /// `redis://host:port/db`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed.
    /// Returns [`DbError::Cache`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let config =
            Config::from_url(url).map_err(|e| DbError::Config(format!("Invalid cache URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to cache");
        Ok(Self { client })
    }

    /// Flush all keys from the cache.
    ///
    /// **WARNING:** This deletes all data. Only use for testing.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Cache`] if the flush fails.
    pub async fn flush_all(&self) -> Result<(), DbError> {
        let _: () = self.client.flushall(false).await?;
        Ok(())
    }

    /// Return a reference to the underlying [`Client`].
    pub const fn client(&self) -> &Client {
        &self.client
    }
}

impl KeyValueStore for CachePool {
    async fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        let value: Option<String> = self.client.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DbError> {
        let secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let _: () = self
            .client
            .set(key, value, Some(Expiration::EX(secs)), None, false)
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), DbError> {
        let _: u32 = self.client.del(key).await?;
        Ok(())
    }
}
