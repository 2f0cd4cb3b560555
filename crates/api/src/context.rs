use gateward_auth::TokenClaims;
use gateward_core::UserId;

/// Principal context for a request (authenticated identity + resolved roles).
///
/// Inserted by the authorization middleware when the request carried a
/// verified token; bypass paths (docs session, load-test switch) run without
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: Option<UserId>,
    roles: Vec<String>,
}

impl PrincipalContext {
    pub fn from_claims(claims: &TokenClaims) -> Self {
        Self {
            user_id: claims.subject_id(),
            roles: claims.resolve_roles().to_vec(),
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }
}
