//! Service-to-service credential check.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use secrecy::{ExposeSecret, SecretString};
use tower::{Layer, Service};

/// Header carrying the shared credential.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Body of a rejected request.
pub const UNAUTHORIZED_BODY: &str = "Unauthorized";

/// Rejects requests without the configured `X-API-KEY`, except on the
/// exempt path.
#[derive(Clone)]
pub struct ApiKeyLayer {
    api_key: Arc<SecretString>,
    exempt_path: Arc<str>,
}

impl ApiKeyLayer {
    /// Creates the layer.
    #[must_use]
    pub fn new(api_key: SecretString, exempt_path: &str) -> Self {
        Self {
            api_key: Arc::new(api_key),
            exempt_path: Arc::from(exempt_path),
        }
    }
}

impl std::fmt::Debug for ApiKeyLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyLayer")
            .field("exempt_path", &self.exempt_path)
            .finish_non_exhaustive()
    }
}

impl<S> Layer<S> for ApiKeyLayer {
    type Service = ApiKeyService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ApiKeyService {
            inner,
            api_key: Arc::clone(&self.api_key),
            exempt_path: Arc::clone(&self.exempt_path),
        }
    }
}

/// Service produced by [`ApiKeyLayer`].
#[derive(Clone)]
pub struct ApiKeyService<S> {
    inner: S,
    api_key: Arc<SecretString>,
    exempt_path: Arc<str>,
}

impl<S> ApiKeyService<S> {
    fn permits(&self, req: &Request<Body>) -> bool {
        if req.uri().path() == &*self.exempt_path {
            return true;
        }
        req.headers()
            .get(API_KEY_HEADER)
            .is_some_and(|v| v.as_bytes() == self.api_key.expose_secret().as_bytes())
    }
}

impl<S> Service<Request<Body>> for ApiKeyService<S>
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
        if !self.permits(&req) {
            tracing::debug!(path = %req.uri().path(), "Missing or wrong API key");
            return Box::pin(async {
                Ok((StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY).into_response())
            });
        }

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move { inner.call(req).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use tower::{ServiceBuilder, ServiceExt};

    fn svc() -> impl Service<Request<Body>, Response = Response, Error = Infallible> + Clone {
        ServiceBuilder::new()
            .layer(ApiKeyLayer::new(SecretString::from("k3y"), "/health"))
            .service_fn(|_req: Request<Body>| async { Ok::<_, Infallible>(StatusCode::OK.into_response()) })
    }

    fn request(path: &str, key: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(key) = key {
            builder = builder.header("X-API-KEY", key);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_key_required() {
        let response = svc().oneshot(request("/api/v1/auth-sessions", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = svc().oneshot(request("/api/v1/auth-sessions", Some("nope"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = svc().oneshot(request("/api/v1/auth-sessions", Some("k3y"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_exempt() {
        let response = svc().oneshot(request("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
