//! Error taxonomy at the Session Manager boundary.
//!
//! Validation and ownership errors are recovered here and translated into
//! structured variants for the caller; storage faults pass through
//! unchanged as the only fatal class. No failed operation leaves a
//! session partially mutated.

use yeardle_db::DbError;
use yeardle_game::GameError;

/// Errors surfaced by the Session Manager.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The guessed year is non-positive or exceeds the current calendar
    /// year. Rejected before any state mutation.
    #[error("invalid guess: {0}")]
    InvalidInput(String),

    /// The requested session does not exist or does not belong to the
    /// requesting identity.
    #[error("session not found")]
    NotFound,

    /// The session already reached a terminal state; a user-facing
    /// condition, not a system fault.
    #[error("session is already completed")]
    AlreadyCompleted,

    /// The durable or ephemeral store cannot be reached. The engine has
    /// no independent recovery path; this propagates upward uncaught.
    #[error("storage unavailable: {0}")]
    Storage(#[from] DbError),
}

impl From<GameError> for EngineError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::InvalidYear { .. } => Self::InvalidInput(err.to_string()),
            // A full ledger implies a terminal session.
            GameError::AlreadyCompleted | GameError::LedgerFull => Self::AlreadyCompleted,
        }
    }
}
