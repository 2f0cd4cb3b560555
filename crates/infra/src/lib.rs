//! `gateward-infra` — persistence collaborators behind the auth traits.
//!
//! Postgres-backed stores for production, in-memory stores for tests and
//! database-less development, and the file-then-config signing-secret source.

pub mod memory;
pub mod postgres;
pub mod secrets;

pub use memory::{MemoryAuthStore, MemorySessionStore};
pub use postgres::PgAuthStore;
pub use secrets::SecretSettings;
