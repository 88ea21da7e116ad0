//! In-memory [`KeyValueStore`] implementation.
//!
//! A test double for the ephemeral store's cache: a mutex-guarded map with
//! per-key expiry checked on read. Also usable for local development
//! without a cache server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::error::DbError;
use crate::kv::KeyValueStore;

/// One stored value plus its expiry deadline.
#[derive(Debug, Clone)]
struct Slot {
    value: String,
    expires_at: Instant,
}

/// An in-memory key-value store with TTL semantics.
///
/// Cloning shares the underlying map, mirroring how a real cache client
/// handle is cloned across callers.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Slot>> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live (unexpired) keys. Intended for test assertions.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .values()
            .filter(|slot| slot.expires_at > now)
            .count()
    }

    /// Whether the store holds no live keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        let mut slots = self.lock();
        match slots.get(key) {
            Some(slot) if slot.expires_at > Instant::now() => Ok(Some(slot.value.clone())),
            Some(_) => {
                slots.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DbError> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| DbError::Config(format!("TTL overflows the clock: {ttl:?}")))?;
        self.lock().insert(
            key.to_owned(),
            Slot {
                value: value.to_owned(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), DbError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete_roundtrip() {
        let store = MemoryStore::new();
        store
            .set("k", "v", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_owned()));

        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_keys_read_as_absent() {
        let store = MemoryStore::new();
        store.set("k", "v", Duration::ZERO).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn set_overwrites_and_resets_ttl() {
        let store = MemoryStore::new();
        store.set("k", "old", Duration::ZERO).await.unwrap();
        store
            .set("k", "new", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("new".to_owned()));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        store
            .set("k", "v", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(other.get("k").await.unwrap(), Some("v".to_owned()));
    }
}
