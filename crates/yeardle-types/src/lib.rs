//! Shared type definitions for the Yeardle session engine.
//!
//! This crate is the single source of truth for the types used across the
//! Yeardle workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the web frontend.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe ID wrappers (sessions, players, events) and the
//!   anonymous session token
//! - [`enums`] -- Enumeration types (session outcome, guess direction)
//! - [`structs`] -- Core entity structs (catalog events, guesses) and the
//!   player identity variants

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Direction, Outcome};
pub use ids::{AnonymousToken, EventId, PlayerId, SessionId, TOKEN_HEX_LEN};
pub use structs::{GameEvent, Guess, PlayerIdentity};
