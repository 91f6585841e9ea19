//! Jobmesh HTTP server
//!
//! This is the thin application shell that wires the pipeline crates together
//! and exposes them over HTTP. Core business logic lives in the `crates/`
//! directory.

pub mod error;
pub mod routes;
pub mod state;

use anyhow::Context;
use jobmesh_browser::BrowserEngine;
use jobmesh_core::AppConfig;
use jobmesh_db::Database;
use jobmesh_sources::{build_adapters, FallbackLinks, SourceLoader, SourceRegistry};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub use state::AppState;

/// Initialize tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,jobmesh=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

/// Open the database, load sources and wire every service.
pub async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let db = Database::new(&config.general.database_path)
        .await
        .with_context(|| {
            format!(
                "failed to open database at {}",
                config.general.database_path.display()
            )
        })?;
    db.run_migrations().await.context("failed to run migrations")?;
    let db = Arc::new(db);

    let loader = SourceLoader::from_config(config.sources.definitions_dir.as_deref())
        .context("failed to locate source definitions")?;
    let registry = SourceRegistry::load_from(&loader).context("failed to load source definitions")?;
    info!(
        sources = registry.count(),
        dir = %loader.definitions_dir().display(),
        "Loaded source definitions"
    );

    let engine = if config.browser.enabled {
        match BrowserEngine::launch(&config.browser).await {
            Ok(engine) => Some(Arc::new(engine)),
            Err(e) => {
                warn!(error = %e, "Browser launch failed, browser tier disabled");
                None
            }
        }
    } else {
        info!("Browser tier disabled by configuration");
        None
    };

    let adapters = build_adapters(&registry, engine, &config.sources)
        .context("failed to build source adapters")?;
    let fallback = FallbackLinks::from_registry(&registry);
    info!(
        adapters = adapters.len(),
        fallback_boards = fallback.len(),
        "Source adapters ready"
    );

    Ok(AppState::new(config, db, adapters, fallback))
}

/// Load configuration, build the app and serve until shutdown.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting jobmesh v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_with_env().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    let state = build_state(&config).await?;
    let db = state.db.clone();
    let app = routes::router(
        state,
        Duration::from_secs(config.general.request_timeout_secs),
    );

    let listener = tokio::net::TcpListener::bind(&config.general.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.general.bind_addr))?;
    info!(addr = %config.general.bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
}
