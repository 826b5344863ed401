//! Todo Lists API
//!
//! Serves the in-memory todo list store over HTTP.
//!
//! # Configuration
//!
//! Settings are read from `.env` in the working directory, overlaid by the
//! process environment. The file must exist and must set `IP_ADDRESS`;
//! otherwise the process exits with status 1. See [`ServerConfig`] for the
//! full list of keys. `RUST_LOG` controls the log filter.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_lists_api::api::{AppState, router};
use todo_lists_api::config::{DEFAULT_CONFIG_FILE, LogFormat, ServerConfig};
use todo_lists_api::infrastructure::{HttpIdentityProvider, IdentityProvider, InMemoryListStore};

/// Caps a requested worker count at four times the available parallelism.
fn capped_worker_threads(requested: usize) -> usize {
    let max_threads = std::thread::available_parallelism()
        .map(|parallelism| parallelism.get().saturating_mul(4))
        .unwrap_or(64);
    if requested > max_threads {
        eprintln!(
            "Warning: WORKER_THREADS={requested} exceeds recommended limit ({max_threads}), capping to {max_threads}"
        );
        max_threads
    } else {
        requested
    }
}

fn main() {
    // Logging is not up yet, so configuration errors go to stderr.
    let config = match ServerConfig::load(DEFAULT_CONFIG_FILE) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Configuration error: {error}");
            std::process::exit(1);
        }
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(threads) = config.worker_threads {
        builder.worker_threads(capped_worker_threads(threads));
    }

    let runtime = builder.build().expect("Failed to create tokio runtime");
    runtime.block_on(async_main(config));
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "todo_lists_api=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn async_main(config: ServerConfig) {
    init_tracing(config.log_format);

    tracing::info!(
        bind_address = %config.bind_address,
        id_policy = %config.id_policy,
        require_auth = config.require_auth,
        "Starting Todo Lists API"
    );

    let store = Arc::new(InMemoryListStore::seeded_with_id_policy(config.id_policy));
    let identity = Arc::new(HttpIdentityProvider::new(config.identity.clone()));
    tracing::info!(
        provider = identity.provider_name(),
        base_url = %identity.config().base_url,
        "Identity provider configured"
    );

    let state = AppState::new(store, identity).with_require_auth(config.require_auth);
    let application = router(state);

    let listener = match TcpListener::bind(config.bind_address.as_str()).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, "Failed to bind to address {}", config.bind_address);
            std::process::exit(1);
        }
    };

    match listener.local_addr() {
        Ok(address) => tracing::info!("Listening on {}", address),
        Err(error) => tracing::warn!(%error, "Could not determine local address"),
    }

    if let Err(error) = axum::serve(listener, application)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(%error, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

/// Completes on SIGINT (Ctrl+C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
