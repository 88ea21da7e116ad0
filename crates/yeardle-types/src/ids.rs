//! Type-safe identifier wrappers.
//!
//! Session and player IDs are newtypes around [`Uuid`] to prevent accidental
//! mixing at compile time. Both use UUID v7 (time-ordered) for efficient
//! database indexing. Event IDs are integers because the event catalog is a
//! serial-keyed relational table owned by an external collaborator.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a guessing session.
    SessionId
}

define_id! {
    /// Unique identifier for an identified (registered) player.
    PlayerId
}

/// Unique identifier for an event in the catalog.
///
/// The catalog is a serial-keyed table owned by the catalog collaborator,
/// so this wraps an integer rather than a UUID.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct EventId(pub i64);

impl EventId {
    /// Wrap a raw catalog row id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Return the inner integer value.
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for EventId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EventId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<EventId> for i64 {
    fn from(id: EventId) -> Self {
        id.0
    }
}

/// Length of an anonymous token in hex characters (16 bytes, 128 bits).
pub const TOKEN_HEX_LEN: usize = 32;

/// Opaque token identifying an anonymous player.
///
/// Minted on first contact and carried by the caller (typically in a
/// cookie) on every subsequent request. 128 bits of entropy rendered as a
/// fixed-length lowercase hex string. The token is the only key under
/// which an anonymous player's session is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AnonymousToken(String);

impl AnonymousToken {
    /// Mint a fresh token from 16 random bytes.
    pub fn generate() -> Self {
        let bytes: [u8; 16] = rand::random();
        let mut hex = String::with_capacity(TOKEN_HEX_LEN);
        for byte in bytes {
            // Writing to a String cannot fail.
            let _ = write!(hex, "{byte:02x}");
        }
        Self(hex)
    }

    /// Wrap a token string received from a caller.
    pub const fn from_string(token: String) -> Self {
        Self(token)
    }

    /// Return the token as a hex string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AnonymousToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let session = SessionId::new();
        let player = PlayerId::new();
        // These are different types -- the compiler enforces no mixing.
        assert_ne!(session.into_inner(), Uuid::nil());
        assert_ne!(player.into_inner(), Uuid::nil());
    }

    #[test]
    fn session_ids_are_time_ordered() {
        let first = SessionId::new();
        let second = SessionId::new();
        assert!(first <= second, "UUID v7 ids should be monotonic");
    }

    #[test]
    fn token_is_fixed_length_hex() {
        let token = AnonymousToken::generate();
        assert_eq!(token.as_str().len(), TOKEN_HEX_LEN);
        assert!(token.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!token.as_str().chars().any(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn tokens_are_unique() {
        let a = AnonymousToken::generate();
        let b = AnonymousToken::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn event_id_roundtrips_through_i64() {
        let id = EventId::new(42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(EventId::from(42), id);
    }
}
