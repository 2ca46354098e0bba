//! Startup orchestration.
//!
//! Order: metrics exporter, strategy store (first load is fatal on error),
//! signal handler, HTTP listener. On shutdown the HTTP server drains first,
//! then the store's reloader is stopped.

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::store::{StoreError, StrategyStore};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load sampling strategies: {0}")]
    Store(#[from] StoreError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the service until a shutdown signal arrives.
///
/// Expects a config that already passed `validate_config`.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    if let Some(addr) = config.observability.metrics_socket_addr() {
        metrics::init_metrics(addr);
    }

    let store = Arc::new(
        StrategyStore::new(
            config.strategies.source.as_deref(),
            config.strategies.reload_interval(),
        )
        .await?,
    );

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let listener = TcpListener::bind(&config.http.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.http.bind_address.clone(),
            source,
        })?;

    let server = HttpServer::new(store.clone(), &config.http);
    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)?;

    store.close().await;
    Ok(())
}
