//! Resource Token Service
//!
//! Entry point for the token issuing and validating HTTP service.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use token_service::config::Config;
use token_service::observability::metrics::init_metrics_recorder;
use token_service::routes::{self, AppState};
use token_service::{db, tasks};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "token_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Token Service");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        token_enabled = config.token.enabled,
        ttl_seconds = config.token.ttl_seconds,
        forbidden_on_error = config.token.forbidden_on_error,
        api_key_enabled = config.api_key.enabled,
        "Configuration loaded successfully"
    );

    // Open the token store and create the schema if needed
    info!("Opening token store...");
    let pool = db::connect(&config.database).await.map_err(|e| {
        error!("Failed to open token store: {:?}", e);
        e
    })?;

    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
        e
    })?;

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    let cleanup_interval = config.token.cleanup_interval_seconds;
    let drain_seconds = config.shutdown_drain_seconds;
    let state = Arc::new(AppState::new(pool.clone(), config));

    // Expired token purge
    let cancel_token = CancellationToken::new();
    let cleanup_handle = if cleanup_interval > 0 {
        Some(tokio::spawn(tasks::start_token_cleanup(
            state.tokens.clone(),
            cleanup_interval,
            cancel_token.clone(),
        )))
    } else {
        info!("Expired token cleanup disabled (TOKEN_CLEANUP_INTERVAL_SECONDS=0)");
        None
    };

    let app = routes::build_routes(state, metrics_handle);

    info!("Token Service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(drain_seconds))
        .await?;

    cancel_token.cancel();
    if let Some(handle) = cleanup_handle {
        if let Err(e) = handle.await {
            warn!("Token cleanup task ended abnormally: {}", e);
        }
    }

    db::shutdown(&pool).await;

    info!("Token Service shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
/// Returns when a shutdown signal is received and drain period is complete.
async fn shutdown_signal(drain_secs: u64) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    if drain_secs > 0 {
        warn!("Draining connections for {} seconds...", drain_secs);
        tokio::time::sleep(Duration::from_secs(drain_secs)).await;
        info!("Drain period complete");
    }
}
