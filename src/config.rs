use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub store_backend: StoreBackend,
    pub database_path: PathBuf,
    pub store_rest_url: Option<String>,
    pub store_rest_key: Option<String>,

    // Web Server
    pub web_host: String,
    pub web_port: u16,

    // Admin
    pub admin_password_hash: Option<String>,
    pub admin_password: Option<String>,

    // Outbound HTTP
    pub http_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Local SQLite database at `database_path`
    Sqlite,
    /// Hosted PostgREST-compatible store at `store_rest_url`
    Rest,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Storage
            store_backend: parse_store_backend(&env_or_default("STORE_BACKEND", "sqlite"))?,
            database_path: PathBuf::from(env_or_default("DATABASE_PATH", "./data/blog.sqlite")),
            store_rest_url: optional_env("STORE_REST_URL"),
            store_rest_key: optional_env("STORE_REST_KEY"),

            // Web Server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("WEB_PORT", 8080)?,

            // Admin
            admin_password_hash: optional_env("ADMIN_PASSWORD_HASH"),
            admin_password: optional_env("ADMIN_PASSWORD"),

            // Outbound HTTP
            http_timeout: Duration::from_secs(parse_env_u64("HTTP_TIMEOUT_SECS", 30)?),
        })
    }

    /// Configuration with local defaults, for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            store_backend: StoreBackend::Sqlite,
            database_path: PathBuf::from("./data/test.sqlite"),
            store_rest_url: None,
            store_rest_key: None,
            web_host: "127.0.0.1".to_string(),
            web_port: 0,
            admin_password_hash: None,
            admin_password: None,
            http_timeout: Duration::from_secs(5),
        }
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_backend == StoreBackend::Rest {
            if self.store_rest_url.is_none() {
                return Err(ConfigError::MissingEnvVar("STORE_REST_URL".to_string()));
            }
            if self.store_rest_key.is_none() {
                return Err(ConfigError::MissingEnvVar("STORE_REST_KEY".to_string()));
            }
        }
        if self.http_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "HTTP_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_store_backend(value: &str) -> Result<StoreBackend, ConfigError> {
    match value.to_lowercase().as_str() {
        "sqlite" => Ok(StoreBackend::Sqlite),
        "rest" | "postgrest" => Ok(StoreBackend::Rest),
        _ => Err(ConfigError::InvalidValue {
            name: "STORE_BACKEND".to_string(),
            message: format!("must be 'sqlite' or 'rest', got '{value}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_store_backend() {
        assert_eq!(parse_store_backend("sqlite").unwrap(), StoreBackend::Sqlite);
        assert_eq!(parse_store_backend("SQLITE").unwrap(), StoreBackend::Sqlite);
        assert_eq!(parse_store_backend("rest").unwrap(), StoreBackend::Rest);
        assert_eq!(parse_store_backend("PostgREST").unwrap(), StoreBackend::Rest);
        assert!(parse_store_backend("mongo").is_err());
    }

    #[test]
    fn test_rest_backend_requires_url_and_key() {
        let mut config = Config {
            store_backend: StoreBackend::Rest,
            ..Config::for_testing()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MissingEnvVar(name)) if name == "STORE_REST_URL"));

        config.store_rest_url = Some("https://store.example.com".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::MissingEnvVar(name)) if name == "STORE_REST_KEY"));

        config.store_rest_key = Some("anon-key".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = Config {
            http_timeout: Duration::ZERO,
            ..Config::for_testing()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults_and_overrides() {
        std::env::remove_var("STORE_BACKEND");
        std::env::remove_var("WEB_PORT");
        let config = Config::from_env().unwrap();
        assert_eq!(config.store_backend, StoreBackend::Sqlite);
        assert_eq!(config.web_port, 8080);

        std::env::set_var("WEB_PORT", "9090");
        let config = Config::from_env().unwrap();
        assert_eq!(config.web_port, 9090);

        std::env::set_var("WEB_PORT", "not-a-port");
        assert!(matches!(Config::from_env(), Err(ConfigError::ParseInt { .. })));
        std::env::remove_var("WEB_PORT");
    }
}
