//! Token codec: issuing, parsing, and verifying signed bearer tokens.
//!
//! Tokens are standard three-segment HS256 JWTs. Besides the library-backed
//! verified decode, [`TokenCodec::verify_signature`] recomputes the HMAC over
//! `header.payload` independently as a defense-in-depth check (constant-time
//! comparison via the `hmac` crate).

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sha2::Sha256;
use thiserror::Error;

use gateward_core::UserId;

use crate::claims::TokenClaims;
use crate::roles::Role;

/// Clock skew tolerated by the verified decode, in seconds.
const DECODE_LEEWAY_SECS: u64 = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("issuer is wrong!")]
    WrongIssuer,

    #[error("audience is wrong!")]
    WrongAudience,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("malformed token: {0}")]
    Malformed(String),

    /// Encoding can only fail on programmer error (bad key material, claims
    /// that do not serialize). Not retried.
    #[error("token encoding failed: {0}")]
    Encode(String),
}

/// Result of a non-verifying parse.
///
/// `valid` is false for blank or structurally unreadable input; no error is
/// ever raised to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedToken {
    pub subject_id: Option<UserId>,
    /// Roles re-joined as the comma-separated legacy single-field form.
    pub roles: String,
    pub issuer: String,
    pub audience: String,
    pub valid: bool,
}

/// Issues and verifies signed authentication tokens.
pub struct TokenCodec {
    issuer: String,
    audience: String,
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        secret: impl Into<Vec<u8>>,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            secret: secret.into(),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a token for `subject` carrying one claim per role.
    ///
    /// Each input role may itself be a legacy comma-joined list ("Admin,System");
    /// such values are split so every role becomes an independent claim.
    pub fn issue(
        &self,
        subject: UserId,
        roles: &[Role],
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires = now + self.ttl;
        let role: Vec<String> = roles
            .iter()
            .flat_map(|r| Role::split_joined(r.as_str()))
            .map(|r| r.as_str().to_string())
            .collect();

        let claims = TokenClaims {
            jti: subject.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires.timestamp(),
            expiration: expires.to_rfc3339(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            role,
            legacy_role: Vec::new(),
        };

        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Read a token without verifying its signature.
    ///
    /// Used for diagnostics (issuer/audience mismatch headers) and for legacy
    /// callers that only need the subject id and role list back out.
    pub fn parse(token: &str) -> ParsedToken {
        let token = token.trim();
        if token.is_empty() {
            return ParsedToken::default();
        }
        let mut segments = token.split('.');
        let (Some(_header), Some(payload), Some(_sig), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return ParsedToken::default();
        };
        let Ok(bytes) = URL_SAFE_NO_PAD.decode(payload) else {
            return ParsedToken::default();
        };
        let Ok(claims) = serde_json::from_slice::<TokenClaims>(&bytes) else {
            return ParsedToken::default();
        };

        ParsedToken {
            subject_id: claims.subject_id(),
            roles: claims.roles_joined(),
            issuer: claims.iss.clone(),
            audience: claims.aud.clone(),
            valid: true,
        }
    }

    /// Recompute the expected signature over `header.payload` and compare it
    /// to the token's signature segment.
    ///
    /// Independent of the library validation in [`decode`](Self::decode); the
    /// comparison is constant-time.
    pub fn verify_signature(&self, token: &str) -> bool {
        let mut segments = token.trim().split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return false;
        };
        let Ok(sig_bytes) = URL_SAFE_NO_PAD.decode(signature) else {
            return false;
        };
        let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&self.secret) else {
            return false;
        };
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&sig_bytes).is_ok()
    }

    /// Fully verified decode: signature, issuer, audience, and lifetime (with
    /// a small clock-skew allowance), classifying failures so the response
    /// layer can emit the right diagnostic headers.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = DECODE_LEEWAY_SECS;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        jsonwebtoken::decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidIssuer => TokenError::WrongIssuer,
                ErrorKind::InvalidAudience => TokenError::WrongAudience,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("gateward", "gateward-clients", "unit-test-secret", 1000)
    }

    #[test]
    fn issue_then_decode_recovers_claims() {
        let c = codec();
        let token = c
            .issue(UserId::new(42), &[Role::new("Admin"), Role::new("System")], Utc::now())
            .unwrap();

        let claims = c.decode(&token).unwrap();
        assert_eq!(claims.subject_id(), Some(UserId::new(42)));
        assert_eq!(claims.resolve_roles(), ["Admin", "System"]);
        assert_eq!(claims.iss, "gateward");
        assert_eq!(claims.aud, "gateward-clients");
        assert_eq!(claims.exp - claims.iat, 1000);
    }

    #[test]
    fn comma_joined_roles_become_independent_claims() {
        let c = codec();
        let token = c
            .issue(UserId::new(1), &[Role::new("Admin,System")], Utc::now())
            .unwrap();
        let claims = c.decode(&token).unwrap();
        assert_eq!(claims.resolve_roles(), ["Admin", "System"]);
        assert_eq!(claims.roles_joined(), "Admin,System");
    }

    #[test]
    fn parse_never_fails_on_garbage() {
        assert!(!TokenCodec::parse("").valid);
        assert!(!TokenCodec::parse("   ").valid);
        assert!(!TokenCodec::parse("not-a-token").valid);
        assert!(!TokenCodec::parse("a.b").valid);
        assert!(!TokenCodec::parse("a.b.c.d").valid);
        assert!(!TokenCodec::parse("!!!.###.$$$").valid);
    }

    #[test]
    fn parse_reads_back_without_the_key() {
        let c = codec();
        let token = c
            .issue(UserId::new(9), &[Role::new("Client")], Utc::now())
            .unwrap();
        let parsed = TokenCodec::parse(&token);
        assert!(parsed.valid);
        assert_eq!(parsed.subject_id, Some(UserId::new(9)));
        assert_eq!(parsed.roles, "Client");
        assert_eq!(parsed.issuer, "gateward");
    }

    #[test]
    fn manual_signature_check_agrees_with_issuance() {
        let c = codec();
        let token = c.issue(UserId::new(3), &[Role::new("Admin")], Utc::now()).unwrap();
        assert!(c.verify_signature(&token));

        let other = TokenCodec::new("gateward", "gateward-clients", "different-secret", 1000);
        assert!(!other.verify_signature(&token));

        // Tampered payload must not verify.
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_payload = URL_SAFE_NO_PAD.encode(br#"{"jti":"1","role":["SuperAdmin"]}"#);
        parts[1] = &forged_payload;
        assert!(!c.verify_signature(&parts.join(".")));
    }

    #[test]
    fn decode_classifies_wrong_issuer_and_audience() {
        let c = codec();
        let other_iss =
            TokenCodec::new("someone-else", "gateward-clients", "unit-test-secret", 1000);
        let token = other_iss
            .issue(UserId::new(1), &[Role::new("Admin")], Utc::now())
            .unwrap();
        assert_eq!(c.decode(&token), Err(TokenError::WrongIssuer));

        let other_aud = TokenCodec::new("gateward", "someone-else", "unit-test-secret", 1000);
        let token = other_aud
            .issue(UserId::new(1), &[Role::new("Admin")], Utc::now())
            .unwrap();
        assert_eq!(c.decode(&token), Err(TokenError::WrongAudience));
    }

    #[test]
    fn decode_classifies_expiry_and_bad_signature() {
        let c = codec();
        let issued_long_ago = Utc::now() - chrono::Duration::seconds(5000);
        let token = c
            .issue(UserId::new(1), &[Role::new("Admin")], issued_long_ago)
            .unwrap();
        assert_eq!(c.decode(&token), Err(TokenError::Expired));

        let other = TokenCodec::new("gateward", "gateward-clients", "different-secret", 1000);
        let token = other.issue(UserId::new(1), &[Role::new("Admin")], Utc::now()).unwrap();
        assert_eq!(c.decode(&token), Err(TokenError::InvalidSignature));
    }

    proptest! {
        // For any subject and role set, decode(issue(..)) recovers the same
        // subject and the same roles (order-insensitive).
        #[test]
        fn issue_parse_round_trip(
            subject in 1i64..1_000_000,
            roles in proptest::collection::vec("[A-Za-z][A-Za-z0-9_]{0,12}", 1..5)
        ) {
            let c = codec();
            let role_vals: Vec<Role> = roles.iter().map(|r| Role::new(r.clone())).collect();
            let token = c.issue(UserId::new(subject), &role_vals, Utc::now()).unwrap();

            let claims = c.decode(&token).unwrap();
            prop_assert_eq!(claims.subject_id(), Some(UserId::new(subject)));

            let mut got: Vec<String> = claims.resolve_roles().to_vec();
            let mut want = roles.clone();
            got.sort();
            want.sort();
            prop_assert_eq!(got, want);

            let parsed = TokenCodec::parse(&token);
            prop_assert!(parsed.valid);
            prop_assert_eq!(parsed.subject_id, Some(UserId::new(subject)));
        }
    }
}
