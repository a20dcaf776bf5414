//! Token signing and verification.
//!
//! Tokens are compact HS256 JWTs carrying only `sub`, `iat` and `exp`. The
//! verifier pins the algorithm; a token whose header names anything else is
//! treated as malformed.

pub mod claims;
pub mod signer;
pub mod verifier;

pub use claims::Claims;
pub use signer::JwtSigner;
pub use verifier::{JwtVerifier, Verification};
