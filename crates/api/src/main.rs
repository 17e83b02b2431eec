use std::sync::Arc;

use anyhow::{Context, Result};
use domain::services::{ContentGenerator, MockPushService, PlaceholderGenerator, PushService};
use experience_loop_api::{
    app::{create_app, AppState},
    config::{Config, StorageBackend},
    middleware,
    services::{OpenAiGenerator, WebPushService},
};
use persistence::{EventStore, MemoryStore, PgStore};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()?;

    // Initialize logging and metrics
    middleware::logging::init_logging(&config.logging)
        .context("Failed to initialize logging")?;
    middleware::init_metrics()?;

    info!("Starting Experience Loop API v{}", env!("CARGO_PKG_VERSION"));

    let store = build_store(&config).await?;
    let generator = build_generator(&config)?;
    let push = build_push(&config);

    tokio::fs::create_dir_all(&config.media.dir)
        .await
        .with_context(|| format!("Cannot create media directory {}", config.media.dir))?;

    let addr = config.socket_addr()?;
    let state = AppState::new(config, store, generator, push);

    if let Some(limiter) = state.password_limiter.clone() {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
            loop {
                interval.tick().await;
                limiter.retain_recent();
            }
        });
    }

    let app = create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn build_store(config: &Config) -> Result<Arc<dyn EventStore>> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = persistence::db::connect(&config.database.pool_config())
                .await
                .context("Failed to open the Postgres store")?;

            Ok(Arc::new(PgStore::new(pool)))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

fn build_generator(config: &Config) -> Result<Arc<dyn ContentGenerator>> {
    if config.openai.is_configured() {
        info!(model = %config.openai.model, "OpenAI content generator enabled");
        Ok(Arc::new(OpenAiGenerator::new(&config.openai)?))
    } else {
        warn!("OpenAI API key not set; using placeholder content");
        Ok(Arc::new(PlaceholderGenerator::new()))
    }
}

fn build_push(config: &Config) -> Arc<dyn PushService> {
    if !config.push.enabled {
        info!("Web Push disabled; notifications are logged only");
        return Arc::new(MockPushService::new());
    }
    match WebPushService::new(&config.push) {
        Ok(service) => {
            info!("Web Push enabled");
            Arc::new(service)
        }
        Err(e) => {
            warn!(error = %e, "Web Push not available; notifications are logged only");
            Arc::new(MockPushService::new())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => warn!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
