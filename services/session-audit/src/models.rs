//! Session records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// Logged in, not yet logged out
    Active,
    /// Logout recorded
    LoggedOut,
}

impl SessionStatus {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::LoggedOut => "LOGGED_OUT",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "LOGGED_OUT" => Ok(Self::LoggedOut),
            other => Err(format!("unknown session status '{other}'")),
        }
    }
}

/// A stored session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRecord {
    /// Store-assigned identifier
    pub id: i64,
    /// Hex SHA-256 of the token; the token itself is never stored
    pub token_hash: String,
    /// Subject the token was issued to
    pub username: String,
    /// When the login was recorded
    pub login_time: DateTime<Utc>,
    /// When the logout was recorded
    pub logout_time: Option<DateTime<Utc>>,
    /// Current status
    pub status: SessionStatus,
    /// Row creation time
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Marks the session logged out at `at`.
    pub fn end(&mut self, at: DateTime<Utc>) {
        self.logout_time = Some(at);
        self.status = SessionStatus::LoggedOut;
    }
}

/// A session not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    /// Hex SHA-256 of the token
    pub token_hash: String,
    /// Subject
    pub username: String,
    /// Login time
    pub login_time: DateTime<Utc>,
    /// Initial status
    pub status: SessionStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl NewSession {
    /// An active session for `token`, logged in at `now`.
    #[must_use]
    pub fn active(token: &str, username: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            token_hash: hash_token(token),
            username: username.into(),
            login_time: now,
            status: SessionStatus::Active,
            created_at: now,
        }
    }

    /// Attaches the store-assigned id.
    #[must_use]
    pub fn into_record(self, id: i64) -> SessionRecord {
        SessionRecord {
            id,
            token_hash: self.token_hash,
            username: self.username,
            login_time: self.login_time,
            logout_time: None,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// Lowercase hex SHA-256 of the token's UTF-8 bytes.
#[must_use]
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
