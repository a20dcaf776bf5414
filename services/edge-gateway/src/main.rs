//! Edge Gateway - Main Entry Point

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::http::StatusCode;
use edge_gateway::{CacheBackendKind, Config, Gateway};
use rust_common::shutdown::{drain_deadline, wait_for_signal};
use rust_common::{CacheBackend, CacheClientConfig, LocalCache, RedisCache, TracingConfig, init_tracing};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("loading configuration")?;

    init_tracing(
        &TracingConfig::default()
            .with_service_name("edge-gateway")
            .with_log_level(config.log_level.clone())
            .with_json_output(config.log_json),
    )?;

    info!("Starting Edge Gateway");

    let cache_config = CacheClientConfig::default().with_namespace("auth");
    let cache: Arc<dyn CacheBackend> = match config.cache_backend {
        CacheBackendKind::Redis => Arc::new(
            RedisCache::connect(&config.redis_url, cache_config)
                .await
                .context("connecting to redis")?,
        ),
        CacheBackendKind::Memory => {
            warn!("Using in-process token cache; tokens are not shared between replicas");
            Arc::new(LocalCache::new(cache_config))
        }
    };

    let downstream = Router::new().fallback(|| async { StatusCode::NOT_FOUND });
    let app = Gateway::from_config(&config, cache)?.router(downstream);

    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("binding {}", config.bind_addr()))?;
    info!(addr = %listener.local_addr()?, "Edge Gateway listening");

    tokio::select! {
        result = axum::serve(listener, app).with_graceful_shutdown(wait_for_signal()).into_future() => {
            result.context("server error")?;
        }
        () = drain_deadline(config.shutdown_timeout) => {}
    }

    info!("Edge Gateway stopped");
    Ok(())
}
