//! Ephemeral session storage for anonymous players.
//!
//! Each anonymous token owns exactly one cache slot, keyed
//! `anon_session:{token}` and serialized as a flat JSON record. The slot
//! expires 24 hours after its last write; no history is retained beyond
//! the current session.
//!
//! # Known limitation
//!
//! Every write unconditionally overwrites the slot -- there is no merge
//! and no compare-and-set. Two concurrent guesses against the same token
//! can silently lose one guess (last writer wins). Callers needing strict
//! correctness under concurrent anonymous access must serialize per-token
//! access externally.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use yeardle_game::{GuessLedger, Session};
use yeardle_types::{AnonymousToken, EventId, Guess, Outcome, PlayerIdentity, SessionId};

use crate::error::DbError;
use crate::event_catalog::EventLookup;
use crate::kv::KeyValueStore;

/// Time-to-live of an anonymous session slot: 24 hours from last write.
pub const ANONYMOUS_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Flat record layout of one anonymous session slot.
///
/// The event is stored by id only and re-resolved on read; sessions never
/// copy catalog data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemeralSessionRecord {
    /// Session id.
    pub session_id: Uuid,
    /// Referenced catalog event id.
    pub event_id: i64,
    /// Guesses in submission order.
    pub guesses: Vec<Guess>,
    /// Completion timestamp, absent while active.
    pub completed_at: Option<DateTime<Utc>>,
    /// Terminal outcome, absent while active.
    pub outcome: Option<Outcome>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl EphemeralSessionRecord {
    /// Flatten a session into its storage record.
    pub fn from_session(session: &Session) -> Self {
        Self {
            session_id: session.id().into_inner(),
            event_id: session.event().id.into_inner(),
            guesses: session.ledger().iter().copied().collect(),
            completed_at: session.completed_at(),
            outcome: session.outcome(),
            created_at: session.created_at(),
        }
    }
}

/// Storage for anonymous sessions: one TTL-bound slot per token.
#[derive(Clone)]
pub struct EphemeralSessionStore<K: KeyValueStore> {
    kv: K,
    ttl: Duration,
}

impl<K: KeyValueStore> EphemeralSessionStore<K> {
    /// Create a store over the given key-value backend with the default
    /// 24-hour TTL.
    pub const fn new(kv: K) -> Self {
        Self {
            kv,
            ttl: ANONYMOUS_SESSION_TTL,
        }
    }

    /// Override the slot TTL. Intended for tests.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn key(token: &AnonymousToken) -> String {
        format!("anon_session:{token}")
    }

    /// Read the session stored under `token`, re-resolving its event.
    ///
    /// Returns `None` when the slot is absent, expired, or references an
    /// event that no longer exists in the catalog -- all treated
    /// identically to "no session".
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the read, deserialization, or event lookup
    /// fails.
    pub async fn read(
        &self,
        token: &AnonymousToken,
        events: &impl EventLookup,
    ) -> Result<Option<Session>, DbError> {
        let Some(raw) = self.kv.get(&Self::key(token)).await? else {
            return Ok(None);
        };
        let record: EphemeralSessionRecord = serde_json::from_str(&raw)?;

        let Some(event) = events.event_by_id(EventId::new(record.event_id)).await? else {
            tracing::debug!(
                token = %token,
                event_id = record.event_id,
                "Anonymous session references a vanished event; treating as absent"
            );
            return Ok(None);
        };

        Ok(Some(Session::from_parts(
            SessionId::from(record.session_id),
            PlayerIdentity::Anonymous(token.clone()),
            event,
            GuessLedger::from_guesses(record.guesses),
            record.created_at,
            record.completed_at,
            record.outcome,
        )))
    }

    /// Write `session` into the token's slot, overwriting any prior value
    /// and resetting the TTL.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if serialization or the write fails.
    pub async fn write(&self, token: &AnonymousToken, session: &Session) -> Result<(), DbError> {
        let record = EphemeralSessionRecord::from_session(session);
        let json = serde_json::to_string(&record)?;
        self.kv.set(&Self::key(token), &json, self.ttl).await?;

        tracing::debug!(token = %token, session_id = %session.id(), "Wrote anonymous session slot");
        Ok(())
    }

    /// Clear the token's slot.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the delete fails.
    pub async fn delete(&self, token: &AnonymousToken) -> Result<(), DbError> {
        self.kv.delete(&Self::key(token)).await?;
        tracing::debug!(token = %token, "Cleared anonymous session slot");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use yeardle_types::GameEvent;

    use crate::event_catalog::MemoryEventCatalog;
    use crate::memory::MemoryStore;

    fn event() -> GameEvent {
        GameEvent {
            id: EventId::new(7),
            name: "Woodstock festival".to_owned(),
            year: 1969,
            category: "Culture".to_owned(),
            description: "Iconic music festival in upstate New York".to_owned(),
        }
    }

    fn catalog() -> MemoryEventCatalog {
        MemoryEventCatalog::new(vec![event()])
    }

    fn store() -> EphemeralSessionStore<MemoryStore> {
        EphemeralSessionStore::new(MemoryStore::new())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn roundtrip_reconstructs_an_equivalent_session() {
        let store = store();
        let catalog = catalog();
        let token = AnonymousToken::generate();

        let mut session =
            Session::new(PlayerIdentity::Anonymous(token.clone()), event(), now());
        session.submit_at(1960, now()).unwrap();
        session.submit_at(1975, now()).unwrap();

        store.write(&token, &session).await.unwrap();
        let restored = store.read(&token, &catalog).await.unwrap().unwrap();

        assert_eq!(restored.id(), session.id());
        assert_eq!(restored.event(), session.event());
        assert_eq!(restored.created_at(), session.created_at());
        assert_eq!(restored.completed_at(), None);
        assert_eq!(restored.outcome(), None);
        let years: Vec<i32> = restored.ledger().iter().map(|g| g.year).collect();
        assert_eq!(years, vec![1960, 1975]);
    }

    #[tokio::test]
    async fn reading_twice_without_a_write_is_idempotent() {
        let store = store();
        let catalog = catalog();
        let token = AnonymousToken::generate();

        let session = Session::new(PlayerIdentity::Anonymous(token.clone()), event(), now());
        store.write(&token, &session).await.unwrap();

        let first = store.read(&token, &catalog).await.unwrap().unwrap();
        let second = store.read(&token, &catalog).await.unwrap().unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn completed_session_roundtrips_with_outcome() {
        let store = store();
        let catalog = catalog();
        let token = AnonymousToken::generate();

        let mut session =
            Session::new(PlayerIdentity::Anonymous(token.clone()), event(), now());
        session.submit_at(1969, now()).unwrap();

        store.write(&token, &session).await.unwrap();
        let restored = store.read(&token, &catalog).await.unwrap().unwrap();
        assert_eq!(restored.outcome(), Some(Outcome::Won));
        assert_eq!(restored.completed_at(), Some(now()));
    }

    #[tokio::test]
    async fn absent_slot_reads_as_none() {
        let store = store();
        let token = AnonymousToken::generate();
        assert!(store.read(&token, &catalog()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn vanished_event_reads_as_no_session() {
        let store = store();
        let token = AnonymousToken::generate();
        let session = Session::new(PlayerIdentity::Anonymous(token.clone()), event(), now());
        store.write(&token, &session).await.unwrap();

        // Catalog no longer contains event 7.
        let empty_catalog = MemoryEventCatalog::new(vec![]);
        assert!(store.read(&token, &empty_catalog).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_clears_the_slot() {
        let store = store();
        let catalog = catalog();
        let token = AnonymousToken::generate();
        let session = Session::new(PlayerIdentity::Anonymous(token.clone()), event(), now());
        store.write(&token, &session).await.unwrap();

        store.delete(&token).await.unwrap();
        assert!(store.read(&token, &catalog).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_slot_reads_as_none() {
        let store = store().with_ttl(Duration::ZERO);
        let catalog = catalog();
        let token = AnonymousToken::generate();
        let session = Session::new(PlayerIdentity::Anonymous(token.clone()), event(), now());
        store.write(&token, &session).await.unwrap();

        assert!(store.read(&token, &catalog).await.unwrap().is_none());
    }
}
