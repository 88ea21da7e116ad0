//! Core entity structs and the player identity variants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{AnonymousToken, EventId, PlayerId};

// ---------------------------------------------------------------------------
// Catalog event
// ---------------------------------------------------------------------------

/// A historical or cultural event from the catalog.
///
/// Owned by the catalog collaborator and immutable once created. Sessions
/// reference events by id and never copy them into their own storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameEvent {
    /// Catalog row id.
    pub id: EventId,
    /// Short display name, e.g. "Moon landing".
    pub name: String,
    /// The year to be guessed. Positive, never in the future.
    pub year: i32,
    /// Catalog category, e.g. "Tech", "Sports", "History", "Culture".
    pub category: String,
    /// One-sentence description shown to the player.
    pub description: String,
}

// ---------------------------------------------------------------------------
// Guess
// ---------------------------------------------------------------------------

/// One submitted year within a session.
///
/// Created only by submitting a guess on an active session and immutable
/// thereafter. Owned exclusively by the ledger of the session that
/// created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Guess {
    /// The guessed year.
    pub year: i32,
    /// When the guess was submitted.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Player identity
// ---------------------------------------------------------------------------

/// The two kinds of player the engine serves.
///
/// Identified players own durable sessions in relational storage with full
/// history. Anonymous players own at most one session, held in a
/// TTL-expiring cache slot keyed by their token. The Session Manager
/// dispatches on this enum explicitly; both variants see the same
/// behavioral contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase", tag = "kind", content = "id")]
#[ts(export, export_to = "bindings/")]
pub enum PlayerIdentity {
    /// A registered player with a durable, globally unique id.
    Identified(PlayerId),
    /// An anonymous player carrying a minted token.
    Anonymous(AnonymousToken),
}

impl PlayerIdentity {
    /// Whether this identity is the anonymous variant.
    pub const fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous(_))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn identity_variants_are_distinguishable() {
        let identified = PlayerIdentity::Identified(PlayerId::new());
        let anonymous = PlayerIdentity::Anonymous(AnonymousToken::generate());
        assert!(!identified.is_anonymous());
        assert!(anonymous.is_anonymous());
    }

    #[test]
    fn identity_serializes_tagged() {
        let token = AnonymousToken::generate();
        let json = serde_json::to_value(PlayerIdentity::Anonymous(token.clone())).unwrap();
        assert_eq!(json["kind"], "anonymous");
        assert_eq!(json["id"], token.as_str());
    }
}
