//! Edge authentication filter.
//!
//! Runs in front of every route. A request is admitted only if it carries the
//! static API key, a bearer token with a valid signature that has not expired,
//! and that token is still the subject's live token in the cache. All
//! rejections look identical to the caller.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use secrecy::{ExposeSecret, SecretString};
use tower::{Layer, Service};
use tracing::debug;

use crate::jwt::{JwtVerifier, Verification};
use crate::middleware::BypassList;
use crate::storage::TokenStore;

/// Header carrying the static API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Scheme prefix of the authorization header, including the single space.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Why a request was turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// No static API key header
    MissingApiKey,
    /// Static API key present but wrong
    ApiKeyMismatch,
    /// No authorization header
    MissingBearer,
    /// Authorization header without the bearer prefix
    MalformedBearer,
    /// Token failed verification
    Token(Verification),
    /// Token verified but is not the subject's live token
    NotLive,
}

/// Result of running the filter over one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Path is unauthenticated
    Bypass,
    /// All checks passed
    Admitted {
        /// Subject the token belongs to
        subject: String,
    },
    /// A check failed
    Rejected(Rejection),
}

/// Pulls the raw token out of the authorization header.
///
/// # Errors
///
/// [`Rejection::MissingBearer`] when the header is absent,
/// [`Rejection::MalformedBearer`] when it is not a bearer credential.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, Rejection> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(Rejection::MissingBearer)?;
    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .ok_or(Rejection::MalformedBearer)
}

/// The checks applied to each request.
#[derive(Debug)]
pub struct AuthFilter {
    api_key: SecretString,
    verifier: JwtVerifier,
    store: TokenStore,
    bypass: BypassList,
}

impl AuthFilter {
    /// Creates the filter.
    #[must_use]
    pub const fn new(
        api_key: SecretString,
        verifier: JwtVerifier,
        store: TokenStore,
        bypass: BypassList,
    ) -> Self {
        Self {
            api_key,
            verifier,
            store,
            bypass,
        }
    }

    /// Decides whether a request to `path` with `headers` may proceed.
    pub async fn admit(&self, path: &str, headers: &HeaderMap) -> Admission {
        if self.bypass.is_bypassed(path) {
            return Admission::Bypass;
        }
        match self.check(headers).await {
            Ok(subject) => Admission::Admitted { subject },
            Err(rejection) => Admission::Rejected(rejection),
        }
    }

    async fn check(&self, headers: &HeaderMap) -> Result<String, Rejection> {
        let presented = headers
            .get(API_KEY_HEADER)
            .ok_or(Rejection::MissingApiKey)?;
        // TODO: compare in constant time.
        if presented.as_bytes() != self.api_key.expose_secret().as_bytes() {
            return Err(Rejection::ApiKeyMismatch);
        }

        let token = bearer_token(headers)?;

        let subject = match self.verifier.verify(token) {
            Verification::Valid { subject } => subject,
            other => return Err(Rejection::Token(other)),
        };

        if self.store.is_valid(&subject, token).await {
            Ok(subject)
        } else {
            Err(Rejection::NotLive)
        }
    }
}

/// Tower layer applying [`AuthFilter`].
#[derive(Debug, Clone)]
pub struct AuthLayer {
    filter: Arc<AuthFilter>,
}

impl AuthLayer {
    /// Creates the layer over a shared filter.
    #[must_use]
    pub const fn new(filter: Arc<AuthFilter>) -> Self {
        Self { filter }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            filter: Arc::clone(&self.filter),
        }
    }
}

/// Service produced by [`AuthLayer`].
#[derive(Debug)]
pub struct AuthService<S> {
    inner: S,
    filter: Arc<AuthFilter>,
}

impl<S: Clone> Clone for AuthService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            filter: Arc::clone(&self.filter),
        }
    }
}

impl<S> Service<Request<Body>> for AuthService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Error: Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        // Keep the instance that was polled ready.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let filter = Arc::clone(&self.filter);

        Box::pin(async move {
            let admission = filter.admit(req.uri().path(), req.headers()).await;
            match admission {
                Admission::Bypass | Admission::Admitted { .. } => inner.call(req).await,
                Admission::Rejected(reason) => {
                    debug!(path = %req.uri().path(), reason = ?reason, "Request rejected");
                    Ok(StatusCode::UNAUTHORIZED.into_response())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Ok("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_missing() {
        assert_eq!(bearer_token(&HeaderMap::new()), Err(Rejection::MissingBearer));
    }

    #[test]
    fn test_bearer_prefix_is_case_sensitive() {
        for value in ["bearer abc", "Basic abc", "Bearerabc", "BEARER abc"] {
            let mut headers = HeaderMap::new();
            headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
            assert_eq!(bearer_token(&headers), Err(Rejection::MalformedBearer), "{value}");
        }
    }
}
