//! Data layer for the Yeardle session engine (`PostgreSQL` + cache).
//!
//! Identified players get durable relational storage with full history;
//! anonymous players get a single TTL-bound cache slot. Both backends sit
//! behind the same behavioral contract at the Session Manager boundary.
//!
//! ```text
//! Session Manager
//!     |
//!     +-- Identified players --> PostgreSQL (PostgresPool)
//!     |       |-- DurableSessionStore  (sessions + guesses, FOR UPDATE guard)
//!     |       +-- PgEventCatalog       (read-only event lookup)
//!     |
//!     +-- Anonymous players ---> Cache (CachePool, 24h TTL)
//!             +-- EphemeralSessionStore (one flat slot per token)
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool and migrations
//! - [`cache`] -- Redis-compatible cache client
//! - [`kv`] -- TTL key-value abstraction the ephemeral store is built on
//! - [`memory`] -- In-memory key-value fake for tests and local runs
//! - [`event_catalog`] -- Read-only event lookup (`PostgreSQL` and in-memory)
//! - [`durable`] -- Relational session storage for identified players
//! - [`ephemeral`] -- TTL-slot session storage for anonymous players
//! - [`error`] -- Shared error types

pub mod cache;
pub mod durable;
pub mod ephemeral;
pub mod error;
pub mod event_catalog;
pub mod kv;
pub mod memory;
pub mod postgres;

// Re-export primary types for convenience.
pub use cache::CachePool;
pub use durable::{AppendOutcome, CompletedSessionRow, DurableSessionStore, GuessRow, SessionRow};
pub use ephemeral::{ANONYMOUS_SESSION_TTL, EphemeralSessionRecord, EphemeralSessionStore};
pub use error::DbError;
pub use event_catalog::{EventLookup, MemoryEventCatalog, PgEventCatalog};
pub use kv::KeyValueStore;
pub use memory::MemoryStore;
pub use postgres::{PostgresConfig, PostgresPool};
