//! Collaborator traits consumed by the authorization engine.
//!
//! Persistence, session storage, and secret resolution are external to this
//! crate; the engine only sees these interfaces. Implementations live in
//! `gateward-infra` (Postgres, in-memory).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;

use gateward_core::{Capability, UserId};

use crate::roles::Role;

/// Session key holding the API-docs bypass flag.
pub const DOCS_SESSION_KEY: &str = "docs-code";
/// Value of [`DOCS_SESSION_KEY`] marking a pre-authorized docs session.
pub const DOCS_SESSION_OK: &str = "success";
/// Session key holding the docs-scoped token.
pub const DOCS_TOKEN_KEY: &str = "docs-jwt";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(String),
}

/// Per-request view of a user account, rebuilt on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub login_name: String,
    pub enabled: bool,
    pub deleted: bool,
    /// Timestamp of the last security-relevant change (password reset,
    /// forced logout). Tokens issued before it are invalid.
    pub critical_modify_time: DateTime<Utc>,
}

/// Identity resolved by a successful credential check at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginUser {
    pub id: UserId,
    pub roles: Vec<Role>,
}

/// One row of the active role↔module↔permission join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissionRow {
    pub id: i64,
    pub role_id: i64,
    pub role_name: String,
    pub url: String,
    pub deleted: bool,
}

/// SHA-256 hex digest of a submitted password, the form stored alongside
/// user rows and expected by [`UserStore::find_user_by_login`].
pub fn password_digest(password: &str) -> String {
    use core::fmt::Write as _;

    let digest = Sha256::digest(password.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<AuthUser>, StoreError>;

    /// Credential check for the login endpoint. `password_digest` is the
    /// SHA-256 hex digest of the submitted password.
    async fn find_user_by_login(
        &self,
        login_name: &str,
        password_digest: &str,
    ) -> Result<Option<LoginUser>, StoreError>;

    async fn list_users(&self) -> Result<Vec<AuthUser>, StoreError>;
}

#[async_trait]
pub trait PermissionSource: Send + Sync {
    /// Full active role↔module↔permission join, soft-deleted rows included;
    /// the table build filters them so callers see one consistent rule.
    async fn active_role_permission_joins(&self) -> Result<Vec<RolePermissionRow>, StoreError>;
}

/// Keyed per-process session storage. Only consulted as a boolean gate for
/// the docs-session bypass; anything richer belongs to the HTTP layer.
pub trait SessionStore: Send + Sync {
    fn get_string(&self, key: &str) -> Option<String>;
    fn set_string(&self, key: &str, value: &str);
}

/// Signing-secret resolution: prefer an external secret file when present
/// and non-empty, else fall back to the inline configuration value.
pub trait SecretSource: Send + Sync {
    fn resolve_signing_secret(&self) -> Result<String, StoreError>;
}

/// Out-of-band authentication handler (e.g. a remote/federated scheme) that
/// gets first chance at every request. Returning `true` means the handler
/// fully handled the request and the engine must defer to it.
#[async_trait]
pub trait RemoteAuthHandler: Send + Sync {
    async fn handle_request(&self, path: &str) -> bool;
}

/// Access-grant CRUD. No deployment backs these yet, so the default bodies
/// report [`Capability::NotImplemented`]; a backing store overrides them.
#[async_trait]
pub trait GrantStore: Send + Sync {
    async fn grant(&self, _role: &Role, _url: &str) -> Result<Capability<()>, StoreError> {
        Ok(Capability::NotImplemented)
    }

    async fn revoke(&self, _role: &Role, _url: &str) -> Result<Capability<()>, StoreError> {
        Ok(Capability::NotImplemented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn grant_store_defaults_report_absence() {
        struct NoGrants;
        #[async_trait]
        impl GrantStore for NoGrants {}

        let store = NoGrants;
        let granted = store.grant(&Role::new("Admin"), "/api/users.*").await.unwrap();
        assert!(!granted.is_implemented());
        let revoked = store.revoke(&Role::new("Admin"), "/api/users.*").await.unwrap();
        assert!(!revoked.is_implemented());
    }

    #[test]
    fn password_digest_is_lowercase_sha256_hex() {
        assert_eq!(
            password_digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(password_digest("").len(), 64);
    }
}
