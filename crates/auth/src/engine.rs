//! The per-request authorization engine.
//!
//! Decision chain per request:
//! table load → remote-handler check → authenticate → validate user →
//! validate expiry → validate critical-modify → resolve roles → match URL.
//! Every expected denial is a terminal [`Outcome`]; the engine never throws
//! for control flow and never panics.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::claims::TokenClaims;
use crate::requirement::AuthRequirement;
use crate::store::{PermissionSource, RemoteAuthHandler, StoreError, UserStore};

/// Identity source for this deployment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Tokens are issued locally; user state is validated against our own
    /// user store on every request.
    Local,
    /// An external identity provider owns user state; the user-existence and
    /// critical-modify checks are skipped.
    External,
}

/// Result of an authorization decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Allow,
    /// Credential present but insufficient; `reason` is surfaced to the
    /// client when set, otherwise a generic forbidden body is used.
    Deny { status: u16, reason: Option<String> },
    /// No usable credential; the response layer answers with a 401 challenge.
    Challenge { reason: Option<String> },
}

impl Outcome {
    fn deny(status: u16, reason: &str) -> Self {
        Outcome::Deny {
            status,
            reason: Some(reason.to_string()),
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Outcome::Allow)
    }
}

/// Transport-agnostic view of the inbound request.
#[derive(Debug, Clone)]
pub struct RequestCtx<'a> {
    /// Request path, already lowercased by the adapter.
    pub path: &'a str,
    pub method: &'a str,
    pub form_content_type: bool,
    /// Verified claims, when the authentication layer produced a principal.
    pub principal: Option<&'a TokenClaims>,
    /// Pre-authorized API-docs session flag (session store gate).
    pub docs_session: bool,
}

pub struct Engine {
    requirement: Arc<AuthRequirement>,
    users: Arc<dyn UserStore>,
    permissions: Arc<dyn PermissionSource>,
    remote: Option<Arc<dyn RemoteAuthHandler>>,
}

impl Engine {
    pub fn new(
        requirement: Arc<AuthRequirement>,
        users: Arc<dyn UserStore>,
        permissions: Arc<dyn PermissionSource>,
    ) -> Self {
        Self {
            requirement,
            users,
            permissions,
            remote: None,
        }
    }

    /// Register an out-of-band authentication handler that gets first chance
    /// at every request.
    pub fn with_remote_handler(mut self, remote: Arc<dyn RemoteAuthHandler>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn requirement(&self) -> &AuthRequirement {
        &self.requirement
    }

    /// Run the full decision chain for one request.
    pub async fn authorize(&self, req: &RequestCtx<'_>, now: DateTime<Utc>) -> Outcome {
        // Load the shared permission table up front so a denial never races a
        // half-built table.
        let table = match self.requirement.table.get_or_build(&*self.permissions).await {
            Ok(table) => table,
            Err(e) => {
                tracing::error!(error = %e, "permission table build failed");
                return Outcome::Deny {
                    status: 500,
                    reason: None,
                };
            }
        };

        // Out-of-band schemes get first chance; if one claims the request the
        // engine stops and defers entirely.
        if let Some(remote) = &self.remote {
            if remote.handle_request(req.path).await {
                tracing::debug!(path = %req.path, "request handled by remote auth scheme");
                return Outcome::Challenge { reason: None };
            }
        }

        let Some(claims) = req.principal else {
            if self.requirement.test_bypass || req.docs_session {
                return Outcome::Allow;
            }
            return self.unauthenticated(req);
        };

        // Validate user state (skipped when an external provider owns it).
        let mut user = None;
        if self.requirement.mode == AuthMode::Local {
            match self.validate_user(claims).await {
                Ok(u) => user = Some(u),
                Err(outcome) => return outcome,
            }
        }

        // Expiry claim check. The authentication layer already rejects
        // expired tokens with clock skew; this strict check closes the skew
        // window and guards principals produced by other schemes.
        if let Some(expires) = claims.expiry_time() {
            if expires < now {
                return Outcome::deny(401, "authorization expired, please reauthorize");
            }
        }

        // A token issued before the user's last critical modification is
        // revoked, without needing a token blocklist.
        if let (Some(user), Some(issued)) = (&user, claims.issued_at()) {
            if user.critical_modify_time > issued {
                return Outcome::deny(401, "authorization invalidated, please reauthorize");
            }
        }

        let roles = claims.resolve_roles();
        if roles.iter().any(|r| r == &self.requirement.super_admin_role) {
            return Outcome::Allow;
        }

        if roles.is_empty() || !table.matches(roles, req.path) {
            // Information hiding: do not reveal which permission was missing.
            tracing::debug!(path = %req.path, ?roles, "no permission item matched");
            return Outcome::Deny {
                status: 403,
                reason: None,
            };
        }

        Outcome::Allow
    }

    async fn validate_user(
        &self,
        claims: &TokenClaims,
    ) -> Result<crate::store::AuthUser, Outcome> {
        let Some(id) = claims.subject_id() else {
            return Err(Outcome::deny(401, "user not found or deleted"));
        };
        let user = match self.users.find_user_by_id(id).await {
            Ok(user) => user,
            Err(StoreError::Unavailable(e)) | Err(StoreError::Query(e)) => {
                tracing::error!(user_id = %id, error = %e, "user lookup failed");
                return Err(Outcome::Deny {
                    status: 500,
                    reason: None,
                });
            }
        };
        match user {
            None => Err(Outcome::deny(401, "user not found or deleted")),
            Some(u) if u.deleted => Err(Outcome::deny(401, "user deleted, login forbidden")),
            Some(u) if !u.enabled => Err(Outcome::deny(401, "user disabled, login forbidden")),
            Some(u) => Ok(u),
        }
    }

    /// No principal: only the login POST (form-encoded) may proceed.
    fn unauthenticated(&self, req: &RequestCtx<'_>) -> Outcome {
        if req.path == self.requirement.login_path
            && req.method.eq_ignore_ascii_case("POST")
            && req.form_content_type
        {
            return Outcome::Allow;
        }
        Outcome::Challenge { reason: None }
    }
}
