//! Event catalog lookup.
//!
//! The catalog is owned by an external collaborator; the engine only needs
//! two read operations: fetch an event by id and pick one uniformly at
//! random. [`PgEventCatalog`] reads the `events` table;
//! [`MemoryEventCatalog`] serves a fixed list for tests and local runs.

use sqlx::PgPool;

use yeardle_types::{EventId, GameEvent};

use crate::error::DbError;

/// Read-only lookup into the event catalog.
#[allow(async_fn_in_trait)]
pub trait EventLookup {
    /// Fetch the event with the given id, or `None` if it no longer exists.
    async fn event_by_id(&self, id: EventId) -> Result<Option<GameEvent>, DbError>;

    /// Pick one event uniformly at random.
    ///
    /// An empty catalog is an operational fault, reported as
    /// [`DbError::Config`].
    async fn random_event(&self) -> Result<GameEvent, DbError>;
}

// ---------------------------------------------------------------------------
// PostgreSQL catalog
// ---------------------------------------------------------------------------

/// Row shape of the `events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct EventRow {
    id: i64,
    name: String,
    year: i32,
    category: String,
    description: String,
}

impl From<EventRow> for GameEvent {
    fn from(row: EventRow) -> Self {
        Self {
            id: EventId::new(row.id),
            name: row.name,
            year: row.year,
            category: row.category,
            description: row.description,
        }
    }
}

/// Event catalog backed by the `events` table.
#[derive(Clone)]
pub struct PgEventCatalog {
    pool: PgPool,
}

impl PgEventCatalog {
    /// Create a catalog bound to a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl EventLookup for PgEventCatalog {
    async fn event_by_id(&self, id: EventId) -> Result<Option<GameEvent>, DbError> {
        let row = sqlx::query_as::<_, EventRow>(
            r"SELECT id, name, year, category, description
              FROM events
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(GameEvent::from))
    }

    async fn random_event(&self) -> Result<GameEvent, DbError> {
        let row = sqlx::query_as::<_, EventRow>(
            r"SELECT id, name, year, category, description
              FROM events
              ORDER BY RANDOM()
              LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(GameEvent::from)
            .ok_or_else(|| DbError::Config("event catalog is empty".to_owned()))
    }
}

// ---------------------------------------------------------------------------
// In-memory catalog
// ---------------------------------------------------------------------------

/// Event catalog serving a fixed in-memory list.
///
/// For tests and local development; pairs with
/// [`MemoryStore`](crate::memory::MemoryStore).
#[derive(Debug, Clone, Default)]
pub struct MemoryEventCatalog {
    events: Vec<GameEvent>,
}

impl MemoryEventCatalog {
    /// Create a catalog over the given events.
    pub const fn new(events: Vec<GameEvent>) -> Self {
        Self { events }
    }
}

impl EventLookup for MemoryEventCatalog {
    async fn event_by_id(&self, id: EventId) -> Result<Option<GameEvent>, DbError> {
        Ok(self.events.iter().find(|e| e.id == id).cloned())
    }

    async fn random_event(&self) -> Result<GameEvent, DbError> {
        if self.events.is_empty() {
            return Err(DbError::Config("event catalog is empty".to_owned()));
        }
        let index = rand::random_range(0..self.events.len());
        self.events
            .get(index)
            .cloned()
            .ok_or_else(|| DbError::Config("event catalog index out of range".to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn catalog() -> MemoryEventCatalog {
        MemoryEventCatalog::new(vec![
            GameEvent {
                id: EventId::new(1),
                name: "Moon landing".to_owned(),
                year: 1969,
                category: "History".to_owned(),
                description: "Apollo 11 lands on the moon".to_owned(),
            },
            GameEvent {
                id: EventId::new(2),
                name: "First iPhone released".to_owned(),
                year: 2007,
                category: "Tech".to_owned(),
                description: "Apple releases the first iPhone".to_owned(),
            },
        ])
    }

    #[tokio::test]
    async fn lookup_by_id_finds_known_events() {
        let catalog = catalog();
        let event = catalog.event_by_id(EventId::new(2)).await.unwrap();
        assert_eq!(event.unwrap().year, 2007);
        assert!(
            catalog
                .event_by_id(EventId::new(99))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn random_event_draws_from_the_catalog() {
        let catalog = catalog();
        let event = catalog.random_event().await.unwrap();
        assert!([1969, 2007].contains(&event.year));
    }

    #[tokio::test]
    async fn empty_catalog_is_an_error() {
        let catalog = MemoryEventCatalog::default();
        assert!(catalog.random_event().await.is_err());
    }
}
