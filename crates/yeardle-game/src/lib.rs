//! Pure game rules for the Yeardle session engine.
//!
//! Everything in this crate is synchronous, deterministic, and free of I/O.
//! The data layer and the Session Manager build on these rules; they never
//! reimplement them.
//!
//! # Modules
//!
//! - [`feedback`] -- The feedback evaluator: direction and proximity tier
//!   for a guess against the correct year.
//! - [`ledger`] -- The append-only, bounded guess ledger.
//! - [`session`] -- The session state machine (`active` -> `won` | `lost`).
//!
//! # Rules
//!
//! A session is one play-through against a single catalog event, bounded
//! to [`MAX_GUESSES`] guesses. A guess equal to the event's year ends the
//! session as won; the sixth incorrect guess ends it as lost. Completed
//! sessions are immutable.

pub mod feedback;
pub mod ledger;
pub mod session;

// Re-export primary types at crate root.
pub use feedback::{Feedback, Tier, evaluate};
pub use ledger::GuessLedger;
pub use session::{GuessOutcome, Session, SessionState};

use chrono::{DateTime, Datelike, Utc};

/// Maximum number of guesses per session.
pub const MAX_GUESSES: usize = 6;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when applying game rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The guessed year failed validation: it must be a positive integer
    /// no greater than the current calendar year.
    #[error("invalid year {year}: must be between 1 and {max_year}")]
    InvalidYear {
        /// The rejected year.
        year: i32,
        /// The highest acceptable year (the current calendar year).
        max_year: i32,
    },

    /// A guess was submitted against a session that already reached a
    /// terminal state. The session is left unchanged.
    #[error("session is already completed")]
    AlreadyCompleted,

    /// The ledger already holds [`MAX_GUESSES`] guesses. This cannot be
    /// reached through [`Session::submit_at`] (the sixth guess completes
    /// the session) but is reported if a stray over-full ledger is pushed.
    #[error("guess ledger is full ({MAX_GUESSES} guesses)")]
    LedgerFull,
}

/// Validate a guessed year against the rules: positive and not exceeding
/// the calendar year of `now`.
///
/// # Errors
///
/// Returns [`GameError::InvalidYear`] if the year is out of range.
pub fn validate_year(year: i32, now: DateTime<Utc>) -> Result<(), GameError> {
    let max_year = now.year();
    if year < 1 || year > max_year {
        return Err(GameError::InvalidYear { year, max_year });
    }
    Ok(())
}
