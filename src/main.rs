use anyhow::{Context, Result};
use std::{io::ErrorKind, sync::Arc};
use tokio::{net::TcpListener, signal};
use tracing_subscriber::EnvFilter;
use travel_bucketlist::{
    config::AppConfig,
    db,
    routes::routes::app,
    services::seed_service,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting travel-bucketlist with config: {:?}", cfg);

    // --- Initialize SQLite connection ---
    let pool = db::connect(&cfg.database_url, db::DEFAULT_MAX_CONNECTIONS)
        .await
        .with_context(|| format!("opening database {}", cfg.database_url))?;
    db::run_migrations(&pool)
        .await
        .context("running database migrations")?;

    // --- Seed the catalog on first run ---
    match seed_service::seed_if_empty(&pool, &cfg.seed_dir)
        .await
        .context("seeding destination catalog")?
    {
        Some(report) => tracing::info!("Seed report: {:?}", report),
        None => tracing::debug!("Seeding skipped"),
    }

    if migrate {
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }

    // --- Build router ---
    let app = app(AppState::new(Arc::new(pool)));

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::warn!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::warn!("Received SIGTERM, shutting down"),
    }
}
