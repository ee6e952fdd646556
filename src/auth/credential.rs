//! The admin password check guarding edit mode.
//!
//! There is deliberately no session issuance here: a successful check only
//! tells the client it may switch into admin mode.

use anyhow::{Context, Result};
use tracing::warn;

use super::password::{hash_password, verify_password};
use crate::config::Config;

/// Argon2 hash of the admin password, or nothing when admin login is disabled.
#[derive(Debug, Clone, Default)]
pub struct AdminCredential {
    hash: Option<String>,
}

impl AdminCredential {
    /// Build from an existing PHC-format Argon2 hash.
    ///
    /// # Errors
    ///
    /// Returns an error if `hash` is not a valid PHC string.
    pub fn from_hash(hash: impl Into<String>) -> Result<Self> {
        let hash = hash.into();
        argon2::password_hash::PasswordHash::new(&hash)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .context("Invalid ADMIN_PASSWORD_HASH")?;
        Ok(Self { hash: Some(hash) })
    }

    /// Build by hashing a plaintext password.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails.
    pub fn from_password(password: &str) -> Result<Self> {
        Ok(Self {
            hash: Some(hash_password(password)?),
        })
    }

    /// A credential that rejects every candidate.
    #[must_use]
    pub fn disabled() -> Self {
        Self { hash: None }
    }

    /// Resolve from configuration. A configured hash wins over a plaintext password.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured hash is malformed or hashing fails.
    pub fn from_config(config: &Config) -> Result<Self> {
        if let Some(hash) = &config.admin_password_hash {
            return Self::from_hash(hash.clone());
        }
        if let Some(password) = &config.admin_password {
            return Self::from_password(password);
        }
        warn!("Neither ADMIN_PASSWORD_HASH nor ADMIN_PASSWORD is set; admin login is disabled");
        Ok(Self::disabled())
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.hash.is_some()
    }

    /// Check a candidate password.
    #[must_use]
    pub fn verify(&self, candidate: &str) -> bool {
        let Some(hash) = &self.hash else {
            return false;
        };
        match verify_password(candidate, hash) {
            Ok(ok) => ok,
            Err(e) => {
                warn!("Admin password verification failed: {e:#}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_credential() {
        let credential = AdminCredential::from_password("admin123").unwrap();
        assert!(credential.is_enabled());
        assert!(credential.verify("admin123"));
        assert!(!credential.verify("admin1234"));
        assert!(!credential.verify(""));
    }

    #[test]
    fn test_disabled_rejects_everything() {
        let credential = AdminCredential::disabled();
        assert!(!credential.is_enabled());
        assert!(!credential.verify(""));
        assert!(!credential.verify("admin123"));
    }

    #[test]
    fn test_config_prefers_hash() {
        let hash = hash_password("from-hash").unwrap();
        let config = Config {
            admin_password_hash: Some(hash),
            admin_password: Some("from-plaintext".to_string()),
            ..Config::for_testing()
        };
        let credential = AdminCredential::from_config(&config).unwrap();
        assert!(credential.verify("from-hash"));
        assert!(!credential.verify("from-plaintext"));
    }

    #[test]
    fn test_malformed_hash_rejected() {
        assert!(AdminCredential::from_hash("plainly-not-a-hash").is_err());
    }
}
