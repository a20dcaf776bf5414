//! HTTP API of the session audit service.

pub mod api_key;
pub mod handlers;

use std::any::Any;
use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use secrecy::SecretString;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::error::INTERNAL_ERROR_BODY;
use crate::service::SessionLifecycleService;
use crate::storage::SessionRepository;

pub use api_key::ApiKeyLayer;

/// Path of the unauthenticated health probe.
pub const HEALTH_PATH: &str = "/health";

/// State shared by the handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Session lifecycle operations
    pub sessions: SessionLifecycleService<dyn SessionRepository>,
}

impl AppState {
    /// State over any repository.
    #[must_use]
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self {
            sessions: SessionLifecycleService::new(repository),
        }
    }
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
}

/// Builds the router with routes under `base_path`, e.g. `/api/v1`.
pub fn router(state: AppState, api_key: SecretString, base_path: &str) -> Router {
    Router::new()
        .route(&format!("{base_path}/auth-sessions"), post(handlers::create_session))
        .route(&format!("{base_path}/auth-sessions/end"), put(handlers::end_session))
        .route(HEALTH_PATH, get(handlers::health))
        .with_state(state)
        .layer(ApiKeyLayer::new(api_key, HEALTH_PATH))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}
