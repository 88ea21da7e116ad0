//! The guess ledger: an append-only, bounded sequence of guesses.
//!
//! Insertion order is submission order is chronological order. Entries are
//! never modified, removed, or reordered, and the ledger never grows past
//! [`MAX_GUESSES`].

use serde::{Deserialize, Serialize};

use yeardle_types::Guess;

use crate::{GameError, MAX_GUESSES};

/// Ordered collection of one session's guesses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessLedger {
    guesses: Vec<Guess>,
}

impl GuessLedger {
    /// Create an empty ledger.
    pub const fn new() -> Self {
        Self {
            guesses: Vec::new(),
        }
    }

    /// Rehydrate a ledger from stored guesses, preserving order.
    ///
    /// Used by the stores when loading a persisted session. The input is
    /// trusted to respect the bound; a full ledger simply accepts no
    /// further appends.
    pub const fn from_guesses(guesses: Vec<Guess>) -> Self {
        Self { guesses }
    }

    /// Number of guesses recorded so far.
    pub const fn len(&self) -> usize {
        self.guesses.len()
    }

    /// Whether no guesses have been recorded.
    pub const fn is_empty(&self) -> bool {
        self.guesses.is_empty()
    }

    /// Whether the ledger has reached [`MAX_GUESSES`].
    pub const fn is_full(&self) -> bool {
        self.guesses.len() >= MAX_GUESSES
    }

    /// Guesses remaining before the ledger is full.
    pub const fn attempts_remaining(&self) -> usize {
        MAX_GUESSES.saturating_sub(self.guesses.len())
    }

    /// Iterate over guesses in submission order.
    pub fn iter(&self) -> core::slice::Iter<'_, Guess> {
        self.guesses.iter()
    }

    /// The most recently appended guess, if any.
    pub fn last(&self) -> Option<&Guess> {
        self.guesses.last()
    }

    /// Append a guess.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::LedgerFull`] if the ledger already holds
    /// [`MAX_GUESSES`] guesses. No mutation occurs on error.
    pub fn push(&mut self, guess: Guess) -> Result<(), GameError> {
        if self.is_full() {
            return Err(GameError::LedgerFull);
        }
        self.guesses.push(guess);
        Ok(())
    }
}

impl<'a> IntoIterator for &'a GuessLedger {
    type Item = &'a Guess;
    type IntoIter = core::slice::Iter<'a, Guess>;

    fn into_iter(self) -> Self::IntoIter {
        self.guesses.iter()
    }
}
