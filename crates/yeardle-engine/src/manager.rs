//! The Session Manager: the one boundary the surrounding application calls.
//!
//! The manager is a stateless coordinator. It owns no sessions -- each
//! session belongs to its store -- and dispatches explicitly on the player
//! identity kind: identified players route to durable storage, anonymous
//! players to the TTL cache. Both see the same behavioral contract.
//!
//! The "at most one active session per identified player" invariant has no
//! atomic constraint at the storage layer, so the manager enforces it at
//! write time: whenever it is about to hand out or open a session it
//! repairs stray duplicates by force-completing all but the most recently
//! created one as lost.

use chrono::{DateTime, Utc};

use yeardle_db::durable::{AppendOutcome, DurableSessionStore, SessionRow};
use yeardle_db::ephemeral::EphemeralSessionStore;
use yeardle_db::event_catalog::EventLookup;
use yeardle_db::kv::KeyValueStore;
use yeardle_db::DbError;
use yeardle_game::{evaluate, GuessLedger, GuessOutcome, Session, MAX_GUESSES};
use yeardle_types::{
    AnonymousToken, EventId, Guess, Outcome, PlayerId, PlayerIdentity, SessionId,
};

use crate::error::EngineError;

/// Default number of completed sessions returned for history views.
const DEFAULT_HISTORY_LIMIT: i64 = 10;

/// What the caller gets back from a guess submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessResponse {
    /// The evaluator's verdict on the guess.
    pub feedback: yeardle_game::Feedback,
    /// Guesses left after this one.
    pub attempts_remaining: usize,
    /// Whether this guess completed the session.
    pub terminal: bool,
    /// The terminal outcome, if the session completed.
    pub outcome: Option<Outcome>,
}

/// One completed session, summarized for a history view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Session id.
    pub session_id: SessionId,
    /// Name of the guessed event.
    pub event_name: String,
    /// The event's correct year.
    pub event_year: i32,
    /// Number of guesses used.
    pub guess_count: i64,
    /// How the session ended.
    pub outcome: Outcome,
    /// When the session completed.
    pub completed_at: DateTime<Utc>,
}

/// The game-session engine's façade.
///
/// Generic over the cache backend and the event catalog so tests can
/// substitute in-memory fakes for both.
pub struct SessionManager<K: KeyValueStore, L: EventLookup> {
    durable: DurableSessionStore,
    ephemeral: EphemeralSessionStore<K>,
    events: L,
    history_limit: i64,
}

impl<K: KeyValueStore, L: EventLookup> SessionManager<K, L> {
    /// Create a manager over the two stores and the event catalog.
    pub const fn new(
        durable: DurableSessionStore,
        ephemeral: EphemeralSessionStore<K>,
        events: L,
    ) -> Self {
        Self {
            durable,
            ephemeral,
            events,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Override the default history limit.
    #[must_use]
    pub const fn with_history_limit(mut self, limit: i64) -> Self {
        self.history_limit = limit;
        self
    }

    // =========================================================================
    // Public operations
    // =========================================================================

    /// Return the identity's active session, creating one if none exists.
    ///
    /// For identified players this first repairs any stray duplicate
    /// active sessions. For anonymous players a completed session in the
    /// slot does not count as active and is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] on storage faults.
    pub async fn get_or_create_active_session(
        &self,
        identity: &PlayerIdentity,
    ) -> Result<Session, EngineError> {
        let now = Utc::now();
        match identity {
            PlayerIdentity::Identified(player) => {
                match self.repair_and_find_active(*player, now).await? {
                    Some(row) => self.load_identified(*player, &row).await,
                    None => self.create_identified(*player, now).await,
                }
            }
            PlayerIdentity::Anonymous(token) => {
                if let Some(session) = self.ephemeral.read(token, &self.events).await?
                    && !session.is_completed()
                {
                    return Ok(session);
                }
                self.create_anonymous(token, now).await
            }
        }
    }

    /// Submit a guess against the identity's session with id `session_id`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidInput`] if the year fails validation;
    ///   rejected before any lookup or mutation.
    /// - [`EngineError::NotFound`] if the session does not exist or is not
    ///   owned by `identity`.
    /// - [`EngineError::AlreadyCompleted`] if the session is terminal.
    /// - [`EngineError::Storage`] on storage faults.
    pub async fn submit_guess(
        &self,
        identity: &PlayerIdentity,
        session_id: SessionId,
        year: i32,
    ) -> Result<GuessResponse, EngineError> {
        let now = Utc::now();
        yeardle_game::validate_year(year, now)?;

        match identity {
            PlayerIdentity::Identified(player) => {
                self.submit_identified(*player, session_id, year, now).await
            }
            PlayerIdentity::Anonymous(token) => {
                self.submit_anonymous(token, session_id, year, now).await
            }
        }
    }

    /// Up to `limit` of the identity's completed sessions, most recently
    /// completed first.
    ///
    /// Always empty for anonymous players: the ephemeral store retains
    /// only the single current slot, by design.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] on storage faults.
    pub async fn recent_completed_sessions(
        &self,
        identity: &PlayerIdentity,
        limit: Option<i64>,
    ) -> Result<Vec<SessionSummary>, EngineError> {
        let PlayerIdentity::Identified(player) = identity else {
            return Ok(Vec::new());
        };

        let limit = limit.unwrap_or(self.history_limit);
        let rows = self.durable.completed_sessions(*player, limit).await?;
        let mut summaries = Vec::with_capacity(rows.len());
        for row in rows {
            let outcome = row.outcome().ok_or_else(|| {
                DbError::Config(format!("completed session {} has no outcome", row.id))
            })?;
            summaries.push(SessionSummary {
                session_id: SessionId::from(row.id),
                event_name: row.event_name,
                event_year: row.event_year,
                guess_count: row.guess_count,
                outcome,
                completed_at: row.completed_at,
            });
        }
        Ok(summaries)
    }

    /// Open a fresh session, superseding whatever the identity had.
    ///
    /// For anonymous players a completed slot is cleared first so no
    /// orphaned data lingers under a token about to be reused. For
    /// identified players any stray active session is force-completed as
    /// lost to uphold the single-active-session invariant; completed
    /// sessions stay in history.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] on storage faults.
    pub async fn start_new_session(
        &self,
        identity: &PlayerIdentity,
    ) -> Result<Session, EngineError> {
        let now = Utc::now();
        match identity {
            PlayerIdentity::Identified(player) => {
                let actives = self.durable.active_sessions(*player).await?;
                for stray in &actives {
                    self.durable
                        .force_complete(SessionId::from(stray.id), Outcome::Lost, now)
                        .await?;
                }
                if !actives.is_empty() {
                    tracing::info!(
                        player_id = %player,
                        superseded = actives.len(),
                        "Superseded active sessions for explicit new session"
                    );
                }
                self.create_identified(*player, now).await
            }
            PlayerIdentity::Anonymous(token) => {
                if let Some(session) = self.ephemeral.read(token, &self.events).await?
                    && session.is_completed()
                {
                    self.ephemeral.delete(token).await?;
                }
                self.create_anonymous(token, now).await
            }
        }
    }

    /// Transfer an anonymous session into durable storage under a newly
    /// identified player.
    ///
    /// Invoked by the host application at sign-in; not part of the normal
    /// request flow. The session keeps its id, guesses, and completion
    /// state. If the adopted session is active, any stray active durable
    /// sessions are force-completed as lost first. Returns the adopted
    /// session's id, or `None` if the token holds no session.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] on storage faults.
    pub async fn adopt_session(
        &self,
        player: PlayerId,
        token: &AnonymousToken,
    ) -> Result<Option<SessionId>, EngineError> {
        let Some(session) = self.ephemeral.read(token, &self.events).await? else {
            return Ok(None);
        };
        let now = Utc::now();

        if !session.is_completed() {
            let actives = self.durable.active_sessions(player).await?;
            for stray in &actives {
                self.durable
                    .force_complete(SessionId::from(stray.id), Outcome::Lost, now)
                    .await?;
            }
        }

        self.durable.insert_session(player, &session).await?;
        self.ephemeral.delete(token).await?;

        tracing::info!(
            player_id = %player,
            session_id = %session.id(),
            "Adopted anonymous session at sign-in"
        );
        Ok(Some(session.id()))
    }

    // =========================================================================
    // Identified players
    // =========================================================================

    /// Repair stray duplicate active sessions and return the surviving
    /// one, if any.
    ///
    /// More than one active session is a consistency error that should not
    /// occur, but nothing at the storage layer prevents it, so it is
    /// handled defensively: everything but the most recently created
    /// session is force-completed as lost.
    async fn repair_and_find_active(
        &self,
        player: PlayerId,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRow>, EngineError> {
        let actives = self.durable.active_sessions(player).await?;
        if actives.len() > 1 {
            tracing::warn!(
                player_id = %player,
                count = actives.len(),
                "Repairing duplicate active sessions"
            );
        }

        let mut rows = actives.into_iter();
        let keep = rows.next();
        for stray in rows {
            self.durable
                .force_complete(SessionId::from(stray.id), Outcome::Lost, now)
                .await?;
        }
        Ok(keep)
    }

    /// Rebuild a full session from its durable rows.
    async fn load_identified(
        &self,
        player: PlayerId,
        row: &SessionRow,
    ) -> Result<Session, EngineError> {
        let event_id = EventId::new(row.event_id);
        let event = self.events.event_by_id(event_id).await?.ok_or_else(|| {
            // The FK cascade removes sessions with their event, so a miss
            // here means the catalog and session store disagree.
            DbError::Config(format!(
                "session {} references missing event {event_id}",
                row.id
            ))
        })?;

        let guesses: Vec<Guess> = self
            .durable
            .guesses_for(SessionId::from(row.id))
            .await?
            .into_iter()
            .map(|g| Guess {
                year: g.year,
                created_at: g.created_at,
            })
            .collect();

        Ok(Session::from_parts(
            SessionId::from(row.id),
            PlayerIdentity::Identified(player),
            event,
            GuessLedger::from_guesses(guesses),
            row.created_at,
            row.completed_at,
            row.outcome(),
        ))
    }

    async fn create_identified(
        &self,
        player: PlayerId,
        now: DateTime<Utc>,
    ) -> Result<Session, EngineError> {
        let event = self.events.random_event().await?;
        let id = self.durable.create(player, event.id, now).await?;
        tracing::info!(player_id = %player, session_id = %id, event_id = %event.id, "Opened durable session");
        Ok(Session::from_parts(
            id,
            PlayerIdentity::Identified(player),
            event,
            GuessLedger::new(),
            now,
            None,
            None,
        ))
    }

    async fn submit_identified(
        &self,
        player: PlayerId,
        session_id: SessionId,
        year: i32,
        now: DateTime<Utc>,
    ) -> Result<GuessResponse, EngineError> {
        let row = self
            .durable
            .find(player, session_id)
            .await?
            .ok_or(EngineError::NotFound)?;
        if row.is_completed() {
            return Err(EngineError::AlreadyCompleted);
        }

        let event_id = EventId::new(row.event_id);
        let event = self.events.event_by_id(event_id).await?.ok_or_else(|| {
            DbError::Config(format!(
                "session {session_id} references missing event {event_id}"
            ))
        })?;

        match self
            .durable
            .submit_guess(session_id, year, event.year, now)
            .await?
        {
            AppendOutcome::NotFound => Err(EngineError::NotFound),
            AppendOutcome::AlreadyCompleted => Err(EngineError::AlreadyCompleted),
            AppendOutcome::Accepted {
                guess_count,
                outcome,
            } => {
                let used = usize::try_from(guess_count).unwrap_or(MAX_GUESSES);
                Ok(GuessResponse {
                    feedback: evaluate(year, event.year),
                    attempts_remaining: MAX_GUESSES.saturating_sub(used),
                    terminal: outcome.is_some(),
                    outcome,
                })
            }
        }
    }

    // =========================================================================
    // Anonymous players
    // =========================================================================

    async fn create_anonymous(
        &self,
        token: &AnonymousToken,
        now: DateTime<Utc>,
    ) -> Result<Session, EngineError> {
        let event = self.events.random_event().await?;
        let session = Session::new(PlayerIdentity::Anonymous(token.clone()), event, now);
        self.ephemeral.write(token, &session).await?;
        tracing::info!(token = %token, session_id = %session.id(), "Opened anonymous session");
        Ok(session)
    }

    async fn submit_anonymous(
        &self,
        token: &AnonymousToken,
        session_id: SessionId,
        year: i32,
        now: DateTime<Utc>,
    ) -> Result<GuessResponse, EngineError> {
        let mut session = self
            .ephemeral
            .read(token, &self.events)
            .await?
            .ok_or(EngineError::NotFound)?;
        if session.id() != session_id {
            return Err(EngineError::NotFound);
        }
        if session.is_completed() {
            return Err(EngineError::AlreadyCompleted);
        }

        let outcome: GuessOutcome = session.submit_at(year, now)?;
        // Last-writer-wins: a concurrent submission for the same token can
        // overwrite this slot. See the ephemeral store docs.
        self.ephemeral.write(token, &session).await?;

        Ok(GuessResponse {
            feedback: outcome.feedback,
            attempts_remaining: outcome.attempts_remaining,
            terminal: outcome.terminal,
            outcome: outcome.outcome,
        })
    }
}
