use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use depot_api::config::{ServerConfig, StoreBackend};
use depot_api::router::build_app_router;
use depot_api::state::AppState;
use depot_cloud::PublisherSettings;
use depot_core::lifecycle::AssetService;
use depot_core::memory::InMemoryAssetStore;
use depot_core::ports::AssetStore;
use depot_db::PgAssetStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "depot_api=debug,depot_core=debug,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let publisher_settings =
        PublisherSettings::from_env().context("Invalid publisher configuration")?;

    // --- Metadata store ---
    let store = build_store(&config).await?;

    // --- Publisher ---
    let publisher = publisher_settings.build().await;
    let published_dir = publisher_settings.serve_dir().cloned();
    if let Some(dir) = &published_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create publish directory {}", dir.display()))?;
    }

    // --- App state ---
    let assets = AssetService::new(store, publisher);
    let state = AppState {
        assets: assets.clone(),
    };

    let app = build_app_router(state, &config, published_dir.as_deref());

    // --- Start server ---
    let ip = config
        .host
        .parse::<IpAddr>()
        .with_context(|| format!("Invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(ip, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    let in_flight = assets.in_flight();
    tracing::info!(in_flight, "Server stopped accepting connections, draining publishes");

    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(drain, assets.shutdown()).await.is_err() {
        tracing::warn!(
            remaining = assets.in_flight(),
            "Publish tasks still running at shutdown timeout; their assets stay PENDING",
        );
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Install the global subscriber. `LOG_FORMAT=json` selects JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn build_store(config: &ServerConfig) -> anyhow::Result<Arc<dyn AssetStore>> {
    match &config.store {
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = depot_db::create_pool(database_url, *max_connections)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connection pool created");

            depot_db::health_check(&pool)
                .await
                .context("Database health check failed")?;
            tracing::info!("Database health check passed");

            depot_db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            Ok(Arc::new(PgAssetStore::new(pool)))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory asset store; records are lost on restart");
            Ok(Arc::new(InMemoryAssetStore::new()))
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
