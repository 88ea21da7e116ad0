//! Durable session storage for identified players.
//!
//! Sessions and guesses are relational records linked to their player and
//! event with cascading deletes: removing a player removes their sessions
//! and guesses; removing an event removes the sessions that reference it.
//!
//! Guess submission runs in a transaction that locks the session row
//! (`SELECT ... FOR UPDATE`), so two concurrent submissions against the
//! same session serialize at the storage layer instead of both observing
//! an active session and pushing the ledger past its bound.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use yeardle_game::MAX_GUESSES;
use yeardle_types::{EventId, Outcome, PlayerId, SessionId};

use crate::error::DbError;

/// Row shape of the `sessions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRow {
    /// Session id.
    pub id: Uuid,
    /// Owning player id.
    pub player_id: Uuid,
    /// Referenced catalog event id.
    pub event_id: i64,
    /// Completion timestamp, absent while active.
    pub completed_at: Option<DateTime<Utc>>,
    /// Stored outcome text (`won` / `lost`), absent while active.
    pub outcome: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl SessionRow {
    /// Parse the stored outcome text.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome.as_deref().and_then(Outcome::parse)
    }

    /// Whether the session reached a terminal state.
    pub const fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Row shape of the `guesses` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GuessRow {
    /// Guess row id.
    pub id: i64,
    /// Owning session id.
    pub session_id: Uuid,
    /// The guessed year.
    pub year: i32,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

/// One completed session joined with its event, for history views.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompletedSessionRow {
    /// Session id.
    pub id: Uuid,
    /// Name of the guessed event.
    pub event_name: String,
    /// The event's correct year.
    pub event_year: i32,
    /// Stored outcome text (`won` / `lost`).
    pub outcome: Option<String>,
    /// Number of guesses used.
    pub guess_count: i64,
    /// Completion timestamp.
    pub completed_at: DateTime<Utc>,
}

impl CompletedSessionRow {
    /// Parse the stored outcome text.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome.as_deref().and_then(Outcome::parse)
    }
}

/// Result of a guarded guess append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The guess was recorded.
    Accepted {
        /// Total guesses on the session after this one.
        guess_count: i64,
        /// Terminal outcome, if this guess completed the session.
        outcome: Option<Outcome>,
    },
    /// The session was already terminal; nothing was recorded.
    AlreadyCompleted,
    /// The session row no longer exists.
    NotFound,
}

/// Operations on the `sessions` and `guesses` tables.
#[derive(Clone)]
pub struct DurableSessionStore {
    pool: PgPool,
}

impl DurableSessionStore {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a fresh active session for `player` against `event_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn create(
        &self,
        player: PlayerId,
        event_id: EventId,
        now: DateTime<Utc>,
    ) -> Result<SessionId, DbError> {
        let id = SessionId::new();
        sqlx::query(
            r"INSERT INTO sessions (id, player_id, event_id, created_at)
              VALUES ($1, $2, $3, $4)",
        )
        .bind(id.into_inner())
        .bind(player.into_inner())
        .bind(event_id.into_inner())
        .bind(now)
        .execute(&self.pool)
        .await?;

        tracing::debug!(session_id = %id, player_id = %player, "Created durable session");
        Ok(id)
    }

    /// Fetch the session with the given id, scoped to its owning player.
    ///
    /// Returns `None` when the session does not exist **or** belongs to a
    /// different player; callers cannot distinguish the two.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn find(
        &self,
        player: PlayerId,
        session: SessionId,
    ) -> Result<Option<SessionRow>, DbError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r"SELECT id, player_id, event_id, completed_at, outcome, created_at
              FROM sessions
              WHERE id = $1 AND player_id = $2",
        )
        .bind(session.into_inner())
        .bind(player.into_inner())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// All of a player's active sessions, most recently created first.
    ///
    /// Under the single-active-session invariant this returns at most one
    /// row; more than one signals a consistency error the Session Manager
    /// repairs.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn active_sessions(&self, player: PlayerId) -> Result<Vec<SessionRow>, DbError> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r"SELECT id, player_id, event_id, completed_at, outcome, created_at
              FROM sessions
              WHERE player_id = $1 AND completed_at IS NULL
              ORDER BY created_at DESC",
        )
        .bind(player.into_inner())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// A session's guesses in submission order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn guesses_for(&self, session: SessionId) -> Result<Vec<GuessRow>, DbError> {
        let rows = sqlx::query_as::<_, GuessRow>(
            r"SELECT id, session_id, year, created_at
              FROM guesses
              WHERE session_id = $1
              ORDER BY created_at ASC, id ASC",
        )
        .bind(session.into_inner())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Up to `limit` of a player's completed sessions, most recently
    /// completed first, joined with their events for display.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn completed_sessions(
        &self,
        player: PlayerId,
        limit: i64,
    ) -> Result<Vec<CompletedSessionRow>, DbError> {
        let rows = sqlx::query_as::<_, CompletedSessionRow>(
            r"SELECT s.id, e.name AS event_name, e.year AS event_year, s.outcome,
                     (SELECT COUNT(*) FROM guesses g WHERE g.session_id = s.id) AS guess_count,
                     s.completed_at
              FROM sessions s
              JOIN events e ON e.id = s.event_id
              WHERE s.player_id = $1 AND s.completed_at IS NOT NULL
              ORDER BY s.completed_at DESC
              LIMIT $2",
        )
        .bind(player.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Append a guess under a per-session lock and apply the completion
    /// rules: a guess equal to `event_year` wins, the sixth incorrect
    /// guess loses.
    ///
    /// The session row is locked `FOR UPDATE` for the duration of the
    /// transaction and its terminal state re-checked under the lock, so a
    /// concurrent submission cannot double-complete the session or push
    /// the ledger past its bound. An active session found already holding
    /// six guesses is repaired to `lost` and the guess rejected.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if any statement fails; the
    /// transaction rolls back and no partial mutation remains.
    pub async fn submit_guess(
        &self,
        session: SessionId,
        year: i32,
        event_year: i32,
        now: DateTime<Utc>,
    ) -> Result<AppendOutcome, DbError> {
        let max_guesses = i64::try_from(MAX_GUESSES).unwrap_or(i64::MAX);
        let mut tx = self.pool.begin().await?;

        let locked: Option<Option<DateTime<Utc>>> = sqlx::query_scalar(
            r"SELECT completed_at FROM sessions WHERE id = $1 FOR UPDATE",
        )
        .bind(session.into_inner())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(completed_at) = locked else {
            return Ok(AppendOutcome::NotFound);
        };
        if completed_at.is_some() {
            return Ok(AppendOutcome::AlreadyCompleted);
        }

        let count: i64 =
            sqlx::query_scalar(r"SELECT COUNT(*) FROM guesses WHERE session_id = $1")
                .bind(session.into_inner())
                .fetch_one(&mut *tx)
                .await?;

        if count >= max_guesses {
            // Stray over-full active session; close it rather than append.
            sqlx::query(
                r"UPDATE sessions SET completed_at = $2, outcome = 'lost' WHERE id = $1",
            )
            .bind(session.into_inner())
            .bind(now)
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;
            tracing::warn!(session_id = %session, "Repaired over-full active session to lost");
            return Ok(AppendOutcome::AlreadyCompleted);
        }

        sqlx::query(
            r"INSERT INTO guesses (session_id, year, created_at) VALUES ($1, $2, $3)",
        )
        .bind(session.into_inner())
        .bind(year)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let guess_count = count.saturating_add(1);
        let outcome = if year == event_year {
            Some(Outcome::Won)
        } else if guess_count >= max_guesses {
            Some(Outcome::Lost)
        } else {
            None
        };

        if let Some(o) = outcome {
            sqlx::query(
                r"UPDATE sessions SET completed_at = $2, outcome = $3 WHERE id = $1",
            )
            .bind(session.into_inner())
            .bind(now)
            .bind(o.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(session_id = %session, guess_count, ?outcome, "Recorded guess");
        Ok(AppendOutcome::Accepted {
            guess_count,
            outcome,
        })
    }

    /// Force an active session into a terminal state without a guess.
    ///
    /// A no-op on sessions that already completed; won sessions are never
    /// demoted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the update fails.
    pub async fn force_complete(
        &self,
        session: SessionId,
        outcome: Outcome,
        now: DateTime<Utc>,
    ) -> Result<(), DbError> {
        sqlx::query(
            r"UPDATE sessions SET completed_at = $2, outcome = $3
              WHERE id = $1 AND completed_at IS NULL",
        )
        .bind(session.into_inner())
        .bind(now)
        .bind(outcome.as_str())
        .execute(&self.pool)
        .await?;

        tracing::debug!(session_id = %session, outcome = outcome.as_str(), "Force-completed session");
        Ok(())
    }

    /// Copy an in-memory session (typically an adopted anonymous session)
    /// into durable storage under `player`, preserving its id, guesses,
    /// timestamps, and completion state.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if any insert fails; the transaction
    /// rolls back and nothing is persisted.
    pub async fn insert_session(
        &self,
        player: PlayerId,
        session: &yeardle_game::Session,
    ) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"INSERT INTO sessions (id, player_id, event_id, completed_at, outcome, created_at)
              VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(session.id().into_inner())
        .bind(player.into_inner())
        .bind(session.event().id.into_inner())
        .bind(session.completed_at())
        .bind(session.outcome().map(Outcome::as_str))
        .bind(session.created_at())
        .execute(&mut *tx)
        .await?;

        for guess in session.ledger() {
            sqlx::query(
                r"INSERT INTO guesses (session_id, year, created_at) VALUES ($1, $2, $3)",
            )
            .bind(session.id().into_inner())
            .bind(guess.year)
            .bind(guess.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            session_id = %session.id(),
            player_id = %player,
            guesses = session.ledger().len(),
            "Inserted adopted session"
        );
        Ok(())
    }
}
