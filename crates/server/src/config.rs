//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CREWDESK_DATABASE_URL` - `PostgreSQL` connection string
//! - `CREWDESK_JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `CREWDESK_HOST` - Bind address (default: 127.0.0.1)
//! - `CREWDESK_PORT` - Listen port (default: 4000)
//! - `CREWDESK_TOKEN_TTL_HOURS` - Access token lifetime in hours (default: 24)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// JWT signing secret
    pub jwt_secret: SecretString,
    /// Access token lifetime in hours
    pub token_ttl_hours: u64,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` first so a local `.env` file works in
    /// development; real environment variables take precedence.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a required variable is missing, a
    /// value fails to parse, or the JWT secret is too weak.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Ignore a missing .env file; absence is the normal production case.
        let _ = dotenvy::dotenv();

        let database_url = require_env("CREWDESK_DATABASE_URL")?;

        let host = optional_env("CREWDESK_HOST")
            .map_or(Ok(IpAddr::from([127, 0, 0, 1])), |raw| {
                raw.parse()
                    .map_err(|_| ConfigError::InvalidEnvVar("CREWDESK_HOST".into(), raw))
            })?;

        let port = optional_env("CREWDESK_PORT").map_or(Ok(4000), |raw| {
            raw.parse()
                .map_err(|_| ConfigError::InvalidEnvVar("CREWDESK_PORT".into(), raw))
        })?;

        let jwt_secret = require_env("CREWDESK_JWT_SECRET")?;
        validate_secret("CREWDESK_JWT_SECRET", &jwt_secret)?;

        let token_ttl_hours = optional_env("CREWDESK_TOKEN_TTL_HOURS").map_or(Ok(24), |raw| {
            raw.parse()
                .map_err(|_| ConfigError::InvalidEnvVar("CREWDESK_TOKEN_TTL_HOURS".into(), raw))
        })?;

        Ok(Self {
            database_url: SecretString::from(database_url),
            host,
            port,
            jwt_secret: SecretString::from(jwt_secret),
            token_ttl_hours,
            sentry_dsn: optional_env("SENTRY_DSN"),
            sentry_environment: optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Socket address the server binds to.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The raw JWT secret bytes for key construction.
    #[must_use]
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.expose_secret().as_bytes()
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Reject short or obviously-placeholder signing secrets.
fn validate_secret(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            name.to_string(),
            format!("must be at least {MIN_JWT_SECRET_LENGTH} characters"),
        ));
    }

    let lowered = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lowered.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                name.to_string(),
                format!("contains placeholder pattern '{pattern}'"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_secret() {
        let err = validate_secret("TEST", "short").expect_err("must fail");
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn rejects_placeholder_secret() {
        let err = validate_secret("TEST", &"changeme".repeat(8)).expect_err("must fail");
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn accepts_long_random_secret() {
        assert!(validate_secret("TEST", "kXf91mQz7vLp3Wd8Rt2Yb6Ng4Hs0Jc5A").is_ok());
    }
}
