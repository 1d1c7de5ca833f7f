//! Station Proxy - caching front for a radio station's broadcast API

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use station_proxy::{create_admin_router, create_router, spawn_cleanup_task, AppState, Config};

/// Main entry point for the station proxy.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the station API client, cache store and proxy service
/// 4. Start background TTL sweep task
/// 5. Start the admin listener on loopback, if configured
/// 6. Start the public HTTP server
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "station_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Station Proxy");

    let config = Config::from_env();
    info!(
        "Configuration loaded: upstream={}, station={}, cache_ttl={}s, timeout={}s, port={}, cleanup_interval={}s",
        config.station_api_url,
        config.station_id,
        config.cache_ttl,
        config.upstream_timeout,
        config.server_port,
        config.cleanup_interval
    );
    if config.station_api_key.is_none() {
        info!("No STATION_API_KEY set, calling the station API anonymously");
    }
    if config.api_tokens.is_empty() {
        warn!("API_TOKENS is empty, song requests will be refused");
    }

    let state = AppState::from_config(&config).context("failed to initialize station client")?;
    info!("Station service initialized");

    let mut background = vec![spawn_cleanup_task(
        state.service.cache().clone(),
        config.cleanup_interval,
    )];

    if let Some(admin_port) = config.admin_port {
        let addr = SocketAddr::from(([127, 0, 0, 1], admin_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind admin listener on {addr}"))?;
        info!("Admin listener on http://{}", addr);

        let admin = create_admin_router(state.clone());
        background.push(tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, admin).await {
                warn!("Admin listener stopped: {}", e);
            }
        }));
    }

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(background))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops background tasks.
async fn shutdown_signal(background: Vec<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    for handle in background {
        handle.abort();
    }
    warn!("Background tasks aborted");
}
