//! Signing-secret resolution: external file first, inline config second.

use std::path::PathBuf;

use serde::Deserialize;

use gateward_auth::{SecretSource, StoreError};

/// Two-tier signing-secret configuration.
///
/// A secret file, when configured and non-empty, wins over the inline value;
/// a missing or unreadable file falls back to the inline value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretSettings {
    pub secret: String,
    pub secret_file: Option<PathBuf>,
}

impl SecretSettings {
    pub fn new(secret: impl Into<String>, secret_file: Option<PathBuf>) -> Self {
        Self {
            secret: secret.into(),
            secret_file,
        }
    }

    /// Read `JWT_SECRET` / `JWT_SECRET_FILE` from the environment.
    pub fn from_env() -> Self {
        Self {
            secret: std::env::var("JWT_SECRET").unwrap_or_default(),
            secret_file: std::env::var("JWT_SECRET_FILE").ok().map(PathBuf::from),
        }
    }
}

impl SecretSource for SecretSettings {
    fn resolve_signing_secret(&self) -> Result<String, StoreError> {
        if let Some(path) = &self.secret_file {
            match std::fs::read_to_string(path) {
                Ok(contents) => {
                    let contents = contents.trim();
                    if !contents.is_empty() {
                        return Ok(contents.to_string());
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "secret file unreadable, falling back to inline secret"
                    );
                }
            }
        }
        if self.secret.is_empty() {
            return Err(StoreError::Unavailable(
                "no signing secret configured".to_string(),
            ));
        }
        Ok(self.secret.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_wins_when_present_and_non_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jwt.secret");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "file-secret").unwrap();

        let settings = SecretSettings::new("inline-secret", Some(path));
        assert_eq!(settings.resolve_signing_secret().unwrap(), "file-secret");
    }

    #[test]
    fn empty_file_falls_back_to_inline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jwt.secret");
        std::fs::write(&path, "  \n").unwrap();

        let settings = SecretSettings::new("inline-secret", Some(path));
        assert_eq!(settings.resolve_signing_secret().unwrap(), "inline-secret");
    }

    #[test]
    fn missing_file_falls_back_to_inline() {
        let settings = SecretSettings::new(
            "inline-secret",
            Some(PathBuf::from("/nonexistent/jwt.secret")),
        );
        assert_eq!(settings.resolve_signing_secret().unwrap(), "inline-secret");
    }

    #[test]
    fn nothing_configured_is_an_error() {
        let settings = SecretSettings::default();
        assert!(settings.resolve_signing_secret().is_err());
    }
}
