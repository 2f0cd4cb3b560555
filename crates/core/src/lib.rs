//! `gateward-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod capability;
pub mod error;
pub mod id;

pub use capability::Capability;
pub use error::{DomainError, DomainResult};
pub use id::UserId;
