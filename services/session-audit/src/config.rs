//! Centralized configuration for the session audit service.
//!
//! All configuration is loaded from environment variables and validated
//! at startup.

use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Missing required field
    #[error("Missing required configuration: {0}")]
    MissingRequired(&'static str),

    /// A value failed validation
    #[error("Invalid value for {name}: {reason}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Session repository backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryBackend {
    /// PostgreSQL via sqlx
    Postgres,
    /// In-process store (tests, local runs)
    Memory,
}

impl RepositoryBackend {
    /// Parse backend from string.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown backend names.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid {
                name: "REPOSITORY_BACKEND",
                reason: format!("unknown backend '{s}'"),
            }),
        }
    }
}

/// Session audit service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Credential callers must present in `X-API-KEY`
    pub api_key: SecretString,
    /// Path prefix of the session routes, e.g. `/api/v1`
    pub api_base_path: String,
    /// Where session records live
    pub repository_backend: RepositoryBackend,
    /// Postgres connection string (required for the Postgres backend)
    pub database_url: Option<SecretString>,
    /// Schema holding the `auth_sessions` table
    pub db_schema: String,
    /// Connection pool ceiling
    pub db_max_connections: u32,
    /// Graceful shutdown timeout
    pub shutdown_timeout: Duration,
    /// Log level
    pub log_level: String,
    /// Emit JSON logs
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env("PORT", 8081)?,
            api_key: env::var("API_KEY")
                .map(SecretString::from)
                .map_err(|_| ConfigError::MissingRequired("API_KEY"))?,
            api_base_path: env::var("API_BASE_PATH").unwrap_or_else(|_| "/api/v1".to_string()),
            repository_backend: RepositoryBackend::parse(
                &env::var("REPOSITORY_BACKEND").unwrap_or_else(|_| "postgres".to_string()),
            )?,
            database_url: env::var("DATABASE_URL").ok().map(SecretString::from),
            db_schema: env::var("DB_SCHEMA").unwrap_or_else(|_| "public".to_string()),
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 5)?,
            shutdown_timeout: Duration::from_secs(parse_env("SHUTDOWN_TIMEOUT", 30)?),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json: parse_env("LOG_JSON", false)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid {
                name: "PORT",
                reason: "must be between 1 and 65535".to_string(),
            });
        }
        if self.api_key.expose_secret().is_empty() {
            return Err(ConfigError::MissingRequired("API_KEY"));
        }
        if !self.api_base_path.starts_with('/') || self.api_base_path.ends_with('/') {
            return Err(ConfigError::Invalid {
                name: "API_BASE_PATH",
                reason: "must start with '/' and not end with '/'".to_string(),
            });
        }
        if !is_valid_identifier(&self.db_schema) {
            return Err(ConfigError::Invalid {
                name: "DB_SCHEMA",
                reason: "only ASCII letters, digits and '_' are allowed".to_string(),
            });
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: "DB_MAX_CONNECTIONS",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.repository_backend == RepositoryBackend::Postgres && self.database_url.is_none() {
            return Err(ConfigError::MissingRequired("DATABASE_URL"));
        }
        Ok(())
    }

    /// Socket address string the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The schema name is spliced into SQL, so it must be a plain identifier.
fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_env<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
