//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `VAPTEKE_DATABASE_URL` - `PostgreSQL` connection string for the
//!   primary customer store (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `VAPTEKE_LEGACY_DATABASE_URL` - read-only connection string for the
//!   legacy vAptekeSync database; the customer import is unavailable
//!   without it
//! - `VAPTEKE_HOST` - Bind address (default: 127.0.0.1)
//! - `VAPTEKE_PORT` - Listen port (default: 8000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` connection URL for the primary store (contains password)
    pub database_url: SecretString,
    /// Read-only connection URL for the legacy vAptekeSync database
    pub legacy_database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("VAPTEKE_DATABASE_URL")?;
        let legacy_database_url =
            get_optional_env("VAPTEKE_LEGACY_DATABASE_URL").map(SecretString::from);
        let host = get_env_or_default("VAPTEKE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("VAPTEKE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("VAPTEKE_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("VAPTEKE_PORT".to_string(), e.to_string()))?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            database_url,
            legacy_database_url,
            host,
            port,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://localhost/vapteke"),
            legacy_database_url: None,
            host: "0.0.0.0".parse().unwrap(),
            port: 8000,
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_get_env_or_default_falls_back() {
        assert_eq!(
            get_env_or_default("VAPTEKE_TEST_UNSET_VAR", "fallback"),
            "fallback"
        );
    }
}
