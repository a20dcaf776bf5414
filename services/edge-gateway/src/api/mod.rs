//! HTTP surface of the gateway.
//!
//! `/auth/login`, `/auth/logout` and the health probe are served here; every
//! other path is handed to the downstream router once the auth filter admits
//! it.

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use rust_common::{CacheBackend, PlatformError};

use crate::audit::{AuditDispatcher, SessionAuditClient};
use crate::config::Config;
use crate::jwt::{JwtSigner, JwtVerifier};
use crate::middleware::{AuthFilter, AuthLayer, BypassList, TracingLayer};
use crate::storage::TokenStore;

/// State shared by the auth handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Token issuance and liveness
    pub store: TokenStore,
    /// Signature and expiry checks
    pub verifier: JwtVerifier,
    /// Audit notifications
    pub audit: AuditDispatcher,
}

/// Everything the router needs, wired from configuration.
#[derive(Debug)]
pub struct Gateway {
    /// Handler state
    pub state: AppState,
    /// Filter shared by the auth layer
    pub filter: Arc<AuthFilter>,
    /// Health probe path
    pub health_path: String,
}

impl Gateway {
    /// Wires the gateway components over `cache`.
    ///
    /// # Errors
    ///
    /// Returns an error if the audit HTTP client cannot be built.
    pub fn from_config(config: &Config, cache: Arc<dyn CacheBackend>) -> Result<Self, PlatformError> {
        let signer = JwtSigner::new(&config.jwt_secret, config.token_ttl);
        let verifier = JwtVerifier::new(&config.jwt_secret);
        let store = TokenStore::new(cache, signer, config.token_ttl, config.cache_timeout);
        let audit = AuditDispatcher::new(SessionAuditClient::from_config(config)?);

        let filter = Arc::new(AuthFilter::new(
            config.api_key.clone(),
            verifier.clone(),
            store.clone(),
            BypassList::from_parts(&config.bypass_routes, &config.health_path),
        ));

        Ok(Self {
            state: AppState {
                store,
                verifier,
                audit,
            },
            filter,
            health_path: config.health_path.clone(),
        })
    }

    /// Builds the router, with `downstream` receiving admitted traffic.
    pub fn router(self, downstream: Router) -> Router {
        Router::new()
            .route("/auth/login", post(handlers::login))
            .route("/auth/logout", post(handlers::logout))
            .route(&self.health_path, get(handlers::health))
            .with_state(self.state)
            .fallback_service(downstream)
            .layer(AuthLayer::new(self.filter))
            .layer(TracingLayer::new("edge-gateway"))
    }
}
