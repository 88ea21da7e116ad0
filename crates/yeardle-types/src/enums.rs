//! Enumeration types for the Yeardle session engine.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Session outcome
// ---------------------------------------------------------------------------

/// Terminal result of a completed session.
///
/// A session with no outcome is still active; the outcome is set exactly
/// once, together with the completion timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Outcome {
    /// The player guessed the event's year within six attempts.
    Won,
    /// Six guesses were used without matching the event's year.
    Lost,
}

impl Outcome {
    /// Return the lowercase wire/storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }

    /// Parse the lowercase wire/storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "won" => Some(Self::Won),
            "lost" => Some(Self::Lost),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Guess direction
// ---------------------------------------------------------------------------

/// Directional feedback for a guess relative to the correct year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Direction {
    /// The guess matched the event's year exactly.
    Correct,
    /// The correct year is higher than the guessed year.
    Higher,
    /// The correct year is lower than the guessed year.
    Lower,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn outcome_roundtrips_through_str() {
        assert_eq!(Outcome::parse(Outcome::Won.as_str()), Some(Outcome::Won));
        assert_eq!(Outcome::parse(Outcome::Lost.as_str()), Some(Outcome::Lost));
        assert_eq!(Outcome::parse("draw"), None);
    }

    #[test]
    fn outcome_serializes_lowercase() {
        let json = serde_json::to_string(&Outcome::Won).unwrap();
        assert_eq!(json, "\"won\"");
    }
}
