//! Session Audit Service - Main Entry Point

use std::sync::Arc;

use anyhow::Context;
use rust_common::shutdown::{drain_deadline, wait_for_signal};
use rust_common::{TracingConfig, init_tracing};
use session_audit::{
    AppState, Config, InMemorySessionRepository, PgSessionRepository, RepositoryBackend,
    SessionRepository, router,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("loading configuration")?;

    init_tracing(
        &TracingConfig::default()
            .with_service_name("session-audit")
            .with_log_level(config.log_level.clone())
            .with_json_output(config.log_json),
    )?;

    info!("Starting Session Audit Service");

    let repository: Arc<dyn SessionRepository> = match config.repository_backend {
        RepositoryBackend::Postgres => {
            let url = config
                .database_url
                .as_ref()
                .context("DATABASE_URL is required for the postgres backend")?;
            let repo = PgSessionRepository::connect(url, &config.db_schema, config.db_max_connections)
                .await
                .context("connecting to postgres")?;
            repo.ensure_schema().await.context("preparing schema")?;
            Arc::new(repo)
        }
        RepositoryBackend::Memory => {
            warn!("Using in-memory session repository; records are lost on restart");
            Arc::new(InMemorySessionRepository::new())
        }
    };

    let app = router(
        AppState::new(repository),
        config.api_key.clone(),
        &config.api_base_path,
    );

    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("binding {}", config.bind_addr()))?;
    info!(addr = %listener.local_addr()?, base_path = %config.api_base_path, "Session Audit Service listening");

    tokio::select! {
        result = axum::serve(listener, app).with_graceful_shutdown(wait_for_signal()).into_future() => {
            result.context("server error")?;
        }
        () = drain_deadline(config.shutdown_timeout) => {}
    }

    info!("Session Audit Service stopped");
    Ok(())
}
