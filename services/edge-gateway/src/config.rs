//! Type-Safe Configuration with Validation
//!
//! Configuration is read from the environment once at startup and handed to
//! each component explicitly; nothing reads the environment afterwards.

use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Minimum HMAC-SHA-256 key length in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid URL format
    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl {
        /// Variable name
        field: String,
        /// Parser message
        reason: String,
    },

    /// Invalid port number
    #[error("Invalid port: must be between 1 and 65535")]
    InvalidPort,

    /// A duration that must be positive was zero
    #[error("Invalid duration for {0}: must be greater than 0")]
    ZeroDuration(&'static str),

    /// Signing secret is too short for HS256
    #[error("JWT_SECRET must be at least 32 bytes")]
    WeakSecret,

    /// Missing required field
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    /// Environment variable parse error
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError {
        /// Variable name
        name: String,
        /// Parser message
        reason: String,
    },
}

/// Where the gateway keeps live tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    /// Shared Redis instance (multi-replica deployments)
    Redis,
    /// In-process map (single replica, tests)
    Memory,
}

impl std::str::FromStr for CacheBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown cache backend '{other}'")),
        }
    }
}

/// Gateway configuration with validation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port (1-65535)
    pub port: u16,
    /// Static credential every non-bypassed request must carry
    pub api_key: SecretString,
    /// HMAC secret used to sign and verify tokens
    pub jwt_secret: SecretString,
    /// Token lifetime, also the cache-entry TTL
    pub token_ttl: Duration,
    /// Cache backend selection
    pub cache_backend: CacheBackendKind,
    /// Redis URL (used when `cache_backend` is Redis)
    pub redis_url: String,
    /// Upper bound on a single cache call (lookup, write or delete)
    pub cache_timeout: Duration,
    /// Session audit service base URL
    pub session_service_url: Url,
    /// Credential presented to the session audit service
    pub session_service_api_key: SecretString,
    /// API version segment of the session audit routes
    pub api_version: u32,
    /// Upper bound on a single audit notification
    pub audit_timeout: Duration,
    /// Routes that skip authentication; a trailing `*` makes an entry a prefix
    pub bypass_routes: Vec<String>,
    /// Health probe path, also unauthenticated
    pub health_path: String,
    /// Graceful shutdown timeout
    pub shutdown_timeout: Duration,
    /// Log level filter
    pub log_level: String,
    /// Emit JSON logs
    pub log_json: bool,
}

impl Config {
    /// Loads configuration from environment variables with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env("PORT", 8080)?,
            api_key: required_secret("API_KEY")?,
            jwt_secret: required_secret("JWT_SECRET")?,
            token_ttl: Duration::from_secs(parse_env("JWT_TTL_SECS", 3600)?),
            cache_backend: parse_env("CACHE_BACKEND", CacheBackendKind::Redis)?,
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            cache_timeout: Duration::from_millis(parse_env("CACHE_TIMEOUT_MS", 250)?),
            session_service_url: parse_url_env("SESSION_SERVICE_URL", "http://localhost:8081")?,
            session_service_api_key: required_secret("SESSION_SERVICE_API_KEY")?,
            api_version: parse_env("API_VERSION", 1)?,
            audit_timeout: Duration::from_millis(parse_env("AUDIT_TIMEOUT_MS", 2000)?),
            bypass_routes: parse_list_env("BYPASS_ROUTES", &["/auth/login", "/auth/logout"]),
            health_path: env::var("HEALTH_PATH").unwrap_or_else(|_| "/health".to_string()),
            shutdown_timeout: Duration::from_secs(parse_env("SHUTDOWN_TIMEOUT", 30)?),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json: parse_env("LOG_JSON", false)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.jwt_secret.expose_secret().len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::WeakSecret);
        }
        if self.api_key.expose_secret().is_empty() {
            return Err(ConfigError::MissingRequired("API_KEY".to_string()));
        }
        if self.session_service_api_key.expose_secret().is_empty() {
            return Err(ConfigError::MissingRequired("SESSION_SERVICE_API_KEY".to_string()));
        }
        for (name, value) in [
            ("JWT_TTL_SECS", self.token_ttl),
            ("CACHE_TIMEOUT_MS", self.cache_timeout),
            ("AUDIT_TIMEOUT_MS", self.audit_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroDuration(name));
            }
        }
        if !self.health_path.starts_with('/') {
            return Err(ConfigError::ParseError {
                name: "HEALTH_PATH".to_string(),
                reason: "must start with '/'".to_string(),
            });
        }
        Ok(())
    }

    /// Socket address string the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL of the session audit routes, e.g. `http://host/api/v1/auth-sessions`.
    #[must_use]
    pub fn session_audit_base(&self) -> String {
        format!(
            "{}/api/v{}/auth-sessions",
            self.session_service_url.as_str().trim_end_matches('/'),
            self.api_version
        )
    }
}

/// Parse an environment variable with a default value.
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.parse().map_err(|e: T::Err| ConfigError::ParseError {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Read a secret that has no sensible default.
fn required_secret(name: &str) -> Result<SecretString, ConfigError> {
    env::var(name)
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingRequired(name.to_string()))
}

/// Parse a URL environment variable with a default value.
fn parse_url_env(name: &str, default: &str) -> Result<Url, ConfigError> {
    let url_str = env::var(name).unwrap_or_else(|_| default.to_string());
    Url::parse(&url_str).map_err(|e| ConfigError::InvalidUrl {
        field: name.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a comma-separated list environment variable.
fn parse_list_env(name: &str, default: &[&str]) -> Vec<String> {
    env::var(name).map_or_else(
        |_| default.iter().map(ToString::to_string).collect(),
        |v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect()
        },
    )
}
