//! Session Manager façade and configuration for the Yeardle session engine.
//!
//! The surrounding application (HTTP layer, authentication, rendering)
//! calls only the [`SessionManager`]. Everything behind it -- the pure
//! game rules in `yeardle-game` and the dual storage backends in
//! `yeardle-db` -- is an implementation detail of this boundary.
//!
//! ```text
//! caller
//!   |
//!   v
//! SessionManager ---> DurableSessionStore (identified players)
//!   |           \---> EphemeralSessionStore (anonymous players)
//!   |                       |
//!   +--> EventLookup        +--> KeyValueStore (24h TTL)
//! ```
//!
//! # Modules
//!
//! - [`manager`] -- The [`SessionManager`] and its response types.
//! - [`config`] -- YAML configuration with environment overrides.
//! - [`error`] -- The [`EngineError`] taxonomy at the boundary.

pub mod config;
pub mod error;
pub mod manager;

// Re-export primary types at crate root.
pub use config::{ConfigError, EngineConfig, InfrastructureConfig, SessionConfig};
pub use error::EngineError;
pub use manager::{GuessResponse, SessionManager, SessionSummary};
