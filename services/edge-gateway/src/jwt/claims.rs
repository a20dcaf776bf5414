use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload carried by every token the gateway issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the username the token was issued to)
    pub sub: String,
    /// Issued-at, seconds since the Unix epoch
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
    /// Unique per issuance, so two logins in the same second still differ
    pub jti: String,
}

impl Claims {
    /// Claims for `subject` valid from `now` for `ttl_secs` seconds.
    #[must_use]
    pub fn new(subject: impl Into<String>, now: i64, ttl_secs: i64) -> Self {
        Self {
            sub: subject.into(),
            iat: now,
            exp: now.saturating_add(ttl_secs),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_window() {
        let claims = Claims::new("alice", 1_000, 60);
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.iat, 1_000);
        assert_eq!(claims.exp, 1_060);
    }

    #[test]
    fn test_exp_saturates() {
        let claims = Claims::new("alice", i64::MAX - 1, 60);
        assert_eq!(claims.exp, i64::MAX);
    }

    #[test]
    fn test_wire_shape() {
        let claims = Claims::new("bob", 10, 5);
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"sub": "bob", "iat": 10, "exp": 15, "jti": claims.jti})
        );
    }

    #[test]
    fn test_same_instant_claims_differ() {
        let first = Claims::new("alice", 1_000, 60);
        let second = Claims::new("alice", 1_000, 60);
        assert_ne!(first.jti, second.jti);
        assert_ne!(first, second);
    }
}
