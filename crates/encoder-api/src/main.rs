//! Encoder task runner binary.

use std::net::SocketAddr;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use encoder_api::{create_router, metrics, spawn_storage_init, ApiConfig, AppState};
use encoder_media::{check_program, CommandRunner};
use encoder_storage::StorageInitializer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing()?;

    info!("Starting encoder-api");

    let config = ApiConfig::from_env();
    info!(
        "API config: host={}, port={}, actions={}, encoder={}",
        config.host, config.port, config.actions, config.encoder_bin
    );

    for program in [&config.encoder_bin, &config.storage.cli] {
        if let Err(e) = check_program(program) {
            warn!("{}", e);
        }
    }

    let state = AppState::new(&config).context("Failed to create application state")?;

    let metrics_handle = if config.metrics_enabled {
        info!("Prometheus metrics enabled at /metrics");
        Some(metrics::init_metrics().context("Failed to install Prometheus recorder")?)
    } else {
        None
    };

    // Storage registration runs beside the server, never ahead of it
    let storage_init = if config.actions {
        let initializer =
            StorageInitializer::new(&config.storage, CommandRunner::new("storage-init"));
        Some(spawn_storage_init(initializer))
    } else {
        info!("Background actions disabled");
        None
    };

    let app = create_router(state, metrics_handle, config.max_body_size);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid bind address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Up at {}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    info!("Handle shutdown");
    if let Some(task) = storage_init {
        match task.shutdown().await {
            Some(outcome) => info!(?outcome, "Storage initialization stopped"),
            None => error!("Storage initialization task did not stop cleanly"),
        }
    }

    served.context("Server error")?;
    info!("Down");

    Ok(())
}

/// Initialize tracing with colored output for dev, JSON for production.
fn init_tracing() -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("encoder=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
