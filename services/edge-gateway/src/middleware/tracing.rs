//! Request tracing layer.
//!
//! Opens one span per request keyed by a fresh correlation id, logs the
//! outcome with latency, and echoes the id back in `x-correlation-id`.

use std::task::{Context, Poll};
use std::time::Instant;

use axum::http::{HeaderValue, Request, Response};
use futures::future::BoxFuture;
use tower::{Layer, Service};
use tracing::{Instrument, info_span};
use uuid::Uuid;

/// Response header carrying the correlation id.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Tracing layer for Tower.
#[derive(Debug, Clone)]
pub struct TracingLayer {
    service_name: &'static str,
}

impl TracingLayer {
    /// Creates a new tracing layer.
    #[must_use]
    pub const fn new(service_name: &'static str) -> Self {
        Self { service_name }
    }
}

impl<S> Layer<S> for TracingLayer {
    type Service = TracingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TracingService {
            inner,
            service_name: self.service_name,
        }
    }
}

/// Tracing service wrapper.
#[derive(Debug, Clone)]
pub struct TracingService<S> {
    inner: S,
    service_name: &'static str,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for TracingService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Error: std::fmt::Display + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let correlation_id = Uuid::new_v4();
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let span = info_span!(
            "request",
            service = self.service_name,
            correlation_id = %correlation_id,
            method = %req.method(),
            path = %req.uri().path(),
        );

        Box::pin(
            async move {
                let started = Instant::now();
                let result = inner.call(req).await;
                let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

                match result {
                    Ok(mut response) => {
                        tracing::info!(
                            status = response.status().as_u16(),
                            latency_ms,
                            "Request completed"
                        );
                        if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
                            response.headers_mut().insert(CORRELATION_ID_HEADER, value);
                        }
                        Ok(response)
                    }
                    Err(err) => {
                        tracing::error!(error = %err, latency_ms, "Request failed");
                        Err(err)
                    }
                }
            }
            .instrument(span),
        )
    }
}
