use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::error::EdgeError;
use crate::jwt::Claims;

/// Produces HS256 tokens for a subject.
#[derive(Clone)]
pub struct JwtSigner {
    key: EncodingKey,
    ttl_secs: i64,
}

impl JwtSigner {
    /// Creates a signer over `secret` issuing tokens that live for `ttl`.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.expose_secret().as_bytes()),
            ttl_secs: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Signs a fresh token for `subject`, issued now.
    ///
    /// # Errors
    ///
    /// Returns [`EdgeError::Signing`] if encoding fails.
    pub fn sign(&self, subject: &str) -> Result<String, EdgeError> {
        let claims = Claims::new(subject, chrono::Utc::now().timestamp(), self.ttl_secs);
        self.encode(&claims)
    }

    /// Signs arbitrary claims with the configured key.
    ///
    /// # Errors
    ///
    /// Returns [`EdgeError::Signing`] if encoding fails.
    pub fn encode(&self, claims: &Claims) -> Result<String, EdgeError> {
        Ok(jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.key)?)
    }
}

impl std::fmt::Debug for JwtSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSigner")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> JwtSigner {
        JwtSigner::new(
            &SecretString::from("12345678901234567890123456789012"),
            Duration::from_secs(60),
        )
    }

    #[test]
    fn test_token_is_compact_jws() {
        let token = signer().sign("alice").unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_secret_not_in_token_or_debug() {
        let s = signer();
        let token = s.sign("alice").unwrap();
        assert!(!token.contains("1234567890"));
        assert!(!format!("{s:?}").contains("1234567890"));
    }
}
