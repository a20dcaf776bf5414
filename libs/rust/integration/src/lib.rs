//! Harness for running both services in-process on ephemeral ports.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use edge_gateway::{CacheBackendKind, Config, Gateway};
use rust_common::{CacheClientConfig, LocalCache};
use secrecy::SecretString;
use session_audit::{AppState, InMemorySessionRepository};
use tokio::net::TcpListener;
use url::Url;

/// Static credential the gateway expects from clients.
pub const GATEWAY_API_KEY: &str = "e2e-gateway-key";

/// Credential the gateway presents to the session audit service.
pub const SESSION_API_KEY: &str = "e2e-session-key";

/// Signing secret shared by the harness.
pub const JWT_SECRET: &str = "e2e-secret-0123456789abcdefghijkl";

/// Serves `router` on an ephemeral localhost port.
///
/// # Errors
///
/// Returns an error if no port can be bound.
pub async fn serve(router: Router) -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "Test server stopped");
        }
    });
    Ok(addr)
}

/// A running session audit service.
#[derive(Debug)]
pub struct SessionAuditHandle {
    /// Listening address
    pub addr: SocketAddr,
    /// Backing repository, for assertions
    pub repository: Arc<InMemorySessionRepository>,
}

/// Starts the session audit service over an in-memory repository.
///
/// # Errors
///
/// Returns an error if no port can be bound.
pub async fn spawn_session_audit() -> std::io::Result<SessionAuditHandle> {
    let repository = Arc::new(InMemorySessionRepository::new());
    let router = session_audit::router(
        AppState::new(repository.clone()),
        SecretString::from(SESSION_API_KEY),
        "/api/v1",
    );
    Ok(SessionAuditHandle {
        addr: serve(router).await?,
        repository,
    })
}

/// A running edge gateway.
#[derive(Debug)]
pub struct GatewayHandle {
    /// Listening address
    pub addr: SocketAddr,
    /// Token cache, for assertions
    pub cache: LocalCache,
}

/// Gateway configuration pointing at `session_service_url`.
#[must_use]
pub fn gateway_config(session_service_url: Url) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 8080,
        api_key: SecretString::from(GATEWAY_API_KEY),
        jwt_secret: SecretString::from(JWT_SECRET),
        token_ttl: Duration::from_secs(3600),
        cache_backend: CacheBackendKind::Memory,
        redis_url: "redis://127.0.0.1:6379".to_string(),
        cache_timeout: Duration::from_millis(250),
        session_service_url,
        session_service_api_key: SecretString::from(SESSION_API_KEY),
        api_version: 1,
        audit_timeout: Duration::from_secs(2),
        bypass_routes: vec!["/auth/login".to_string(), "/auth/logout".to_string()],
        health_path: "/health".to_string(),
        shutdown_timeout: Duration::from_secs(1),
        log_level: "info".to_string(),
        log_json: false,
    }
}

/// Starts the gateway with `downstream` behind the auth filter.
///
/// # Errors
///
/// Returns an error if no port can be bound or the gateway cannot be wired.
pub async fn spawn_gateway(
    session_service_url: &str,
    downstream: Router,
) -> Result<GatewayHandle, Box<dyn std::error::Error + Send + Sync>> {
    let cache = LocalCache::new(CacheClientConfig::default().with_namespace("auth"));
    let config = gateway_config(Url::parse(session_service_url)?);
    let router = Gateway::from_config(&config, Arc::new(cache.clone()))?.router(downstream);
    Ok(GatewayHandle {
        addr: serve(router).await?,
        cache,
    })
}
