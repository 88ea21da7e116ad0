//! The session state machine.
//!
//! A session starts `active` with an empty ledger and a chosen event, and
//! reaches exactly one of two terminal states:
//!
//! ```text
//!            submit == event.year
//! active ---------------------------> won
//!    |
//!    |  6th submit != event.year
//!    +------------------------------> lost
//! ```
//!
//! Once completed, a session is immutable: every further submit is
//! rejected without mutation. There is no abandon or pause transition; an
//! active session remains active until completed or superseded by the
//! Session Manager.

use chrono::{DateTime, Utc};

use yeardle_types::{GameEvent, Guess, Outcome, PlayerIdentity, SessionId};

use crate::feedback::{Feedback, evaluate};
use crate::ledger::GuessLedger;
use crate::{GameError, validate_year};

/// Lifecycle state of a session, derived from its completion fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting guesses.
    Active,
    /// Completed with a correct guess.
    Won,
    /// Completed after six incorrect guesses.
    Lost,
}

/// Result of one accepted guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessOutcome {
    /// The evaluator's verdict on the guess.
    pub feedback: Feedback,
    /// Guesses left after this one.
    pub attempts_remaining: usize,
    /// Whether this guess completed the session.
    pub terminal: bool,
    /// The terminal outcome, if the session completed.
    pub outcome: Option<Outcome>,
}

/// One play-through against a single catalog event.
///
/// Holds the invariants the engine is built around: the outcome is absent
/// iff the completion timestamp is absent, a winning guess is always the
/// last guess, and the ledger never exceeds six entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: SessionId,
    player: PlayerIdentity,
    event: GameEvent,
    ledger: GuessLedger,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    outcome: Option<Outcome>,
}

impl Session {
    /// Open a fresh active session for `player` against `event`.
    pub fn new(player: PlayerIdentity, event: GameEvent, now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::new(),
            player,
            event,
            ledger: GuessLedger::new(),
            created_at: now,
            completed_at: None,
            outcome: None,
        }
    }

    /// Rehydrate a session from stored state.
    ///
    /// Used by the stores; the fields are trusted to satisfy the session
    /// invariants (they were only ever written through this state machine).
    pub const fn from_parts(
        id: SessionId,
        player: PlayerIdentity,
        event: GameEvent,
        ledger: GuessLedger,
        created_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
        outcome: Option<Outcome>,
    ) -> Self {
        Self {
            id,
            player,
            event,
            ledger,
            created_at,
            completed_at,
            outcome,
        }
    }

    /// The session's unique id.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// The identity that owns this session.
    pub const fn player(&self) -> &PlayerIdentity {
        &self.player
    }

    /// The event being guessed.
    pub const fn event(&self) -> &GameEvent {
        &self.event
    }

    /// The session's guess ledger.
    pub const fn ledger(&self) -> &GuessLedger {
        &self.ledger
    }

    /// When the session was opened.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the session completed, if it has.
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// The terminal outcome, if the session completed.
    pub const fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Whether the session reached a terminal state.
    pub const fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Derived lifecycle state.
    pub const fn state(&self) -> SessionState {
        match self.outcome {
            None => SessionState::Active,
            Some(Outcome::Won) => SessionState::Won,
            Some(Outcome::Lost) => SessionState::Lost,
        }
    }

    /// Guesses left before the session would be lost.
    pub const fn attempts_remaining(&self) -> usize {
        self.ledger.attempts_remaining()
    }

    /// Submit a guess at an explicit timestamp.
    ///
    /// Appends the guess, evaluates feedback, and applies the state
    /// machine: a correct guess wins, a sixth incorrect guess loses,
    /// anything else leaves the session active.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::AlreadyCompleted`] if the session is terminal
    /// and [`GameError::InvalidYear`] if the year fails validation. The
    /// session is unchanged on every error path.
    pub fn submit_at(&mut self, year: i32, now: DateTime<Utc>) -> Result<GuessOutcome, GameError> {
        if self.is_completed() {
            return Err(GameError::AlreadyCompleted);
        }
        validate_year(year, now)?;
        self.ledger.push(Guess {
            year,
            created_at: now,
        })?;

        let feedback = evaluate(year, self.event.year);
        let outcome = if feedback.is_correct {
            Some(Outcome::Won)
        } else if self.ledger.is_full() {
            Some(Outcome::Lost)
        } else {
            None
        };
        if let Some(o) = outcome {
            self.completed_at = Some(now);
            self.outcome = Some(o);
        }

        Ok(GuessOutcome {
            feedback,
            attempts_remaining: self.ledger.attempts_remaining(),
            terminal: outcome.is_some(),
            outcome,
        })
    }

    /// Submit a guess at the current time.
    ///
    /// # Errors
    ///
    /// See [`Session::submit_at`].
    pub fn submit(&mut self, year: i32) -> Result<GuessOutcome, GameError> {
        self.submit_at(year, Utc::now())
    }

    /// Force the session into a terminal state without a guess.
    ///
    /// Used by the Session Manager to reconcile stray duplicate active
    /// sessions. Has no effect on a session that is already completed.
    pub const fn force_complete(&mut self, outcome: Outcome, now: DateTime<Utc>) {
        if self.completed_at.is_none() {
            self.completed_at = Some(now);
            self.outcome = Some(outcome);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use yeardle_types::{AnonymousToken, Direction, EventId};

    use crate::MAX_GUESSES;
    use crate::feedback::Tier;

    fn event(year: i32) -> GameEvent {
        GameEvent {
            id: EventId::new(1),
            name: "Moon landing".to_owned(),
            year,
            category: "History".to_owned(),
            description: "Apollo 11 lands on the moon".to_owned(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn session(year: i32) -> Session {
        Session::new(
            PlayerIdentity::Anonymous(AnonymousToken::generate()),
            event(year),
            now(),
        )
    }

    #[test]
    fn new_session_is_active_with_empty_ledger() {
        let s = session(1969);
        assert_eq!(s.state(), SessionState::Active);
        assert!(!s.is_completed());
        assert!(s.ledger().is_empty());
        assert_eq!(s.attempts_remaining(), MAX_GUESSES);
        assert_eq!(s.outcome(), None);
        assert_eq!(s.completed_at(), None);
    }

    #[test]
    fn correct_first_guess_wins() {
        let mut s = session(1969);
        let out = s.submit_at(1969, now()).unwrap();
        assert!(out.terminal);
        assert_eq!(out.outcome, Some(Outcome::Won));
        assert_eq!(out.attempts_remaining, 5);
        assert_eq!(s.state(), SessionState::Won);
        assert_eq!(s.completed_at(), Some(now()));
    }

    #[test]
    fn winning_guess_is_always_the_last_guess() {
        let mut s = session(2000);
        s.submit_at(1995, now()).unwrap();
        s.submit_at(2005, now()).unwrap();
        let out = s.submit_at(2000, now()).unwrap();
        assert_eq!(out.outcome, Some(Outcome::Won));
        assert_eq!(s.ledger().last().unwrap().year, 2000);
        assert_eq!(s.submit_at(2000, now()), Err(GameError::AlreadyCompleted));
    }

    #[test]
    fn feedback_sequence_matches_tiers() {
        let mut s = session(2000);
        let first = s.submit_at(1995, now()).unwrap();
        assert_eq!(first.feedback.direction, Direction::Higher);
        assert_eq!(first.feedback.tier, Tier::VeryClose);
        let second = s.submit_at(2005, now()).unwrap();
        assert_eq!(second.feedback.direction, Direction::Lower);
        assert_eq!(second.feedback.tier, Tier::VeryClose);
        let third = s.submit_at(2000, now()).unwrap();
        assert!(third.feedback.is_correct);
        assert_eq!(third.attempts_remaining, 3);
        assert_eq!(third.outcome, Some(Outcome::Won));
    }

    #[test]
    fn six_incorrect_guesses_lose() {
        let mut s = session(1969);
        for year in 1990..1995 {
            let out = s.submit_at(year, now()).unwrap();
            assert!(!out.terminal, "guess {year} should not complete the session");
        }
        let sixth = s.submit_at(1995, now()).unwrap();
        assert!(sixth.terminal);
        assert_eq!(sixth.outcome, Some(Outcome::Lost));
        assert_eq!(sixth.attempts_remaining, 0);
        assert_eq!(s.state(), SessionState::Lost);
    }

    #[test]
    fn seventh_guess_is_rejected_without_mutation() {
        let mut s = session(1969);
        for year in 1990..1996 {
            s.submit_at(year, now()).unwrap();
        }
        let before = s.clone();
        assert_eq!(s.submit_at(1969, now()), Err(GameError::AlreadyCompleted));
        assert_eq!(s, before);
        assert_eq!(s.ledger().len(), MAX_GUESSES);
    }

    #[test]
    fn win_on_sixth_attempt_is_a_win() {
        let mut s = session(1969);
        for year in 1990..1995 {
            s.submit_at(year, now()).unwrap();
        }
        let sixth = s.submit_at(1969, now()).unwrap();
        assert_eq!(sixth.outcome, Some(Outcome::Won));
    }

    #[test]
    fn invalid_year_leaves_session_unchanged() {
        let mut s = session(1969);
        let before = s.clone();
        assert!(matches!(
            s.submit_at(0, now()),
            Err(GameError::InvalidYear { .. })
        ));
        assert!(matches!(
            s.submit_at(2027, now()),
            Err(GameError::InvalidYear { .. })
        ));
        assert_eq!(s, before);
    }

    #[test]
    fn force_complete_marks_active_session_lost() {
        let mut s = session(1969);
        s.force_complete(Outcome::Lost, now());
        assert_eq!(s.state(), SessionState::Lost);
        assert_eq!(s.submit_at(1969, now()), Err(GameError::AlreadyCompleted));
    }

    #[test]
    fn force_complete_does_not_overwrite_a_won_session() {
        let mut s = session(1969);
        s.submit_at(1969, now()).unwrap();
        s.force_complete(Outcome::Lost, now());
        assert_eq!(s.outcome(), Some(Outcome::Won));
    }

    #[test]
    fn outcome_absent_iff_completed_at_absent() {
        let mut s = session(1969);
        assert_eq!(s.outcome().is_some(), s.completed_at().is_some());
        s.submit_at(1969, now()).unwrap();
        assert_eq!(s.outcome().is_some(), s.completed_at().is_some());
    }
}
