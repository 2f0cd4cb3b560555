//! `gateward-auth` — authentication/authorization core.
//!
//! This crate is intentionally decoupled from HTTP and storage: the token
//! codec, the role→URL permission table, and the per-request authorization
//! engine all live here, talking to persistence only through the collaborator
//! traits in [`store`]. The HTTP layer adapts requests into a [`RequestCtx`]
//! and maps the resulting [`Outcome`] onto responses.

pub mod cache;
pub mod claims;
pub mod engine;
pub mod policy;
pub mod requirement;
pub mod roles;
pub mod store;
pub mod table;
pub mod token;

pub use cache::TableCache;
pub use claims::{TokenClaims, ClaimsError, validate_claims};
pub use engine::{AuthMode, Engine, Outcome, RequestCtx};
pub use policy::{PolicyRegistry, RolePolicy};
pub use requirement::{AuthRequirement, AuthSettings};
pub use roles::Role;
pub use store::{
    AuthUser, DOCS_SESSION_KEY, DOCS_SESSION_OK, DOCS_TOKEN_KEY, GrantStore, LoginUser,
    PermissionSource, RemoteAuthHandler, RolePermissionRow, SecretSource, SessionStore,
    StoreError, UserStore, password_digest,
};
pub use table::{PermissionItem, PermissionTable, RoleKey, UrlPattern};
pub use token::{ParsedToken, TokenCodec, TokenError};
