//! Authorization requirement: the configuration bundle shared by every
//! request, plus the one mutable part (the permission table cache).

use serde::Deserialize;

use crate::cache::TableCache;
use crate::engine::AuthMode;
use crate::table::RoleKey;
use crate::token::TokenCodec;

/// Default token lifetime, in seconds.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 1000;

/// Startup configuration for the authorization subsystem.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub issuer: String,
    pub audience: String,
    /// Inline signing secret; a secret file, when configured, wins over this
    /// (see `gateward-infra::secrets`).
    pub secret: String,
    pub token_ttl_secs: i64,
    pub login_path: String,
    pub super_admin_role: String,
    pub role_key: RoleKey,
    pub mode: AuthMode,
    /// Load-test switch: requests without a principal are waved through.
    /// Never enable outside synthetic-load environments.
    pub test_bypass: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            issuer: "gateward".to_string(),
            audience: "gateward-clients".to_string(),
            secret: String::new(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            login_path: "/api/login".to_string(),
            super_admin_role: "SuperAdmin".to_string(),
            role_key: RoleKey::Name,
            mode: AuthMode::Local,
            test_bypass: false,
        }
    }
}

impl AuthSettings {
    pub fn codec(&self) -> TokenCodec {
        TokenCodec::new(
            self.issuer.clone(),
            self.audience.clone(),
            self.secret.clone().into_bytes(),
            self.token_ttl_secs,
        )
    }

    pub fn requirement(&self) -> AuthRequirement {
        AuthRequirement {
            login_path: self.login_path.to_lowercase(),
            super_admin_role: self.super_admin_role.clone(),
            mode: self.mode,
            test_bypass: self.test_bypass,
            table: TableCache::new(self.role_key),
        }
    }
}

/// Created once at startup and shared by reference across requests.
///
/// `table` is the only mutable part; it synchronizes internally.
pub struct AuthRequirement {
    pub login_path: String,
    pub super_admin_role: String,
    pub mode: AuthMode,
    pub test_bypass: bool,
    pub table: TableCache,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let s = AuthSettings::default();
        assert_eq!(s.token_ttl_secs, 1000);
        assert_eq!(s.super_admin_role, "SuperAdmin");
        assert!(!s.test_bypass);

        let req = s.requirement();
        assert_eq!(req.login_path, "/api/login");
    }

    #[test]
    fn login_path_is_normalized_lowercase() {
        let s = AuthSettings {
            login_path: "/Api/Login".to_string(),
            ..Default::default()
        };
        assert_eq!(s.requirement().login_path, "/api/login");
    }

    #[test]
    fn settings_deserialize_with_partial_config() {
        let s: AuthSettings =
            serde_json::from_str(r#"{"issuer": "acme", "role_key": "id", "mode": "external"}"#)
                .unwrap();
        assert_eq!(s.issuer, "acme");
        assert_eq!(s.role_key, crate::table::RoleKey::Id);
        assert_eq!(s.mode, AuthMode::External);
        assert_eq!(s.audience, "gateward-clients");
    }
}
