use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};

use crate::jwt::Claims;

/// Outcome of checking a token's signature, expiry and shape.
///
/// Liveness is a separate question answered by the token store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Signature checks out and the token has not expired
    Valid {
        /// Subject the token was issued to
        subject: String,
    },
    /// Signature checks out but `exp` has passed
    Expired,
    /// Signature does not match the configured secret
    BadSignature,
    /// Not a token this gateway could have issued
    Malformed,
}

impl Verification {
    /// The subject when valid.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::Valid { subject } => Some(subject),
            _ => None,
        }
    }
}

/// Verifies HS256 tokens against the shared secret.
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Creates a verifier over `secret`.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        }
    }

    /// Checks `token` and classifies the result.
    #[must_use]
    pub fn verify(&self, token: &str) -> Verification {
        match jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation) {
            Ok(data) if data.claims.sub.is_empty() => Verification::Malformed,
            Ok(data) => Verification::Valid {
                subject: data.claims.sub,
            },
            Err(err) => match err.kind() {
                ErrorKind::ExpiredSignature => Verification::Expired,
                ErrorKind::InvalidSignature => Verification::BadSignature,
                _ => Verification::Malformed,
            },
        }
    }
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier").finish_non_exhaustive()
    }
}
