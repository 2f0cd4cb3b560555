//! Token claims model (transport-agnostic).

use chrono::{DateTime, TimeZone, Utc};
use gateward_core::UserId;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Canonical role claim key, normalized at issuance time.
pub const ROLE_CLAIM: &str = "role";

/// Legacy long-form role claim key, accepted when parsing tokens minted by
/// older issuers. Kept as an explicit compatibility shim; new tokens never
/// carry it.
pub const LEGACY_ROLE_CLAIM: &str =
    "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";

/// Claims carried by gateward-issued tokens.
///
/// `exp` is the standard numeric expiry; `expiration` duplicates it as an
/// RFC 3339 string for consumers that still read the literal expiry claim.
/// The subject id travels in `jti`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenClaims {
    pub jti: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub expiration: String,
    pub iss: String,
    pub aud: String,
    #[serde(
        deserialize_with = "string_or_seq",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub role: Vec<String>,
    #[serde(
        rename = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role",
        deserialize_with = "string_or_seq",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub legacy_role: Vec<String>,
}

impl TokenClaims {
    /// Subject id parsed out of `jti`, if present and numeric.
    pub fn subject_id(&self) -> Option<UserId> {
        self.jti.parse::<UserId>().ok()
    }

    /// Roles resolved across both accepted claim-key spellings.
    ///
    /// The canonical `role` claim wins; the legacy spelling is consulted only
    /// when it is empty.
    pub fn resolve_roles(&self) -> &[String] {
        if self.role.is_empty() {
            &self.legacy_role
        } else {
            &self.role
        }
    }

    /// The legacy single-field view: roles re-joined comma-separated.
    pub fn roles_joined(&self) -> String {
        self.resolve_roles().join(",")
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.iat, 0).single()
    }

    pub fn expiry_time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (nbf is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate the claim time window.
///
/// Note: this validates the *claims* only; signature verification lives in
/// the token codec.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), ClaimsError> {
    if claims.exp <= claims.iat {
        return Err(ClaimsError::InvalidTimeWindow);
    }
    if now.timestamp() < claims.nbf {
        return Err(ClaimsError::NotYetValid);
    }
    if now.timestamp() >= claims.exp {
        return Err(ClaimsError::Expired);
    }
    Ok(())
}

/// Accept a role claim written either as a single string or as an array.
fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;

    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.write_str("a string or a sequence of strings")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::SeqAccess<'de>,
        {
            let mut out = Vec::new();
            while let Some(v) = seq.next_element::<String>()? {
                out.push(v);
            }
            Ok(out)
        }
    }

    deserializer.deserialize_any(Visitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(iat: i64, nbf: i64, exp: i64) -> TokenClaims {
        TokenClaims {
            jti: "7".into(),
            iat,
            nbf,
            exp,
            ..Default::default()
        }
    }

    #[test]
    fn valid_window_passes() {
        let now = Utc::now();
        let c = claims(now.timestamp(), now.timestamp(), (now + Duration::seconds(100)).timestamp());
        assert!(validate_claims(&c, now).is_ok());
    }

    #[test]
    fn expired_is_detected() {
        let now = Utc::now();
        let c = claims(
            (now - Duration::seconds(200)).timestamp(),
            (now - Duration::seconds(200)).timestamp(),
            (now - Duration::seconds(100)).timestamp(),
        );
        assert_eq!(validate_claims(&c, now), Err(ClaimsError::Expired));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let c = claims(now.timestamp(), now.timestamp(), now.timestamp() - 1);
        assert_eq!(validate_claims(&c, now), Err(ClaimsError::InvalidTimeWindow));
    }

    #[test]
    fn role_accepts_string_and_seq() {
        let single: TokenClaims = serde_json::from_str(r#"{"role": "Admin"}"#).unwrap();
        assert_eq!(single.role, vec!["Admin"]);

        let many: TokenClaims = serde_json::from_str(r#"{"role": ["Admin", "System"]}"#).unwrap();
        assert_eq!(many.role, vec!["Admin", "System"]);
    }

    #[test]
    fn legacy_role_spelling_is_a_fallback() {
        let json = format!(r#"{{"{LEGACY_ROLE_CLAIM}": ["Client"]}}"#);
        let c: TokenClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(c.resolve_roles(), ["Client"]);

        let both = format!(r#"{{"role": ["Admin"], "{LEGACY_ROLE_CLAIM}": ["Client"]}}"#);
        let c: TokenClaims = serde_json::from_str(&both).unwrap();
        assert_eq!(c.resolve_roles(), ["Admin"]);
    }

    #[test]
    fn roles_joined_is_comma_separated() {
        let c: TokenClaims = serde_json::from_str(r#"{"role": ["Admin", "System"]}"#).unwrap();
        assert_eq!(c.roles_joined(), "Admin,System");
    }
}
