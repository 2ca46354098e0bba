//! The sampling strategy store: first load, background reload, lookups.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::store::reloader::Reloader;
use crate::store::snapshot::{Snapshot, SnapshotStore};
use crate::store::source::{Fetched, SourceError, StrategySource};
use crate::store::SamplingStrategyProvider;
use crate::strategy::document::{self, ParseError};
use crate::strategy::model::ResolvedStrategy;
use crate::strategy::resolver;

/// Errors that prevent a store from being constructed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Holds the live strategies and keeps them fresh in the background.
pub struct StrategyStore {
    snapshots: Arc<SnapshotStore>,
    shutdown: Shutdown,
    reloader: Mutex<Option<JoinHandle<()>>>,
}

impl StrategyStore {
    /// Build a store from an optional source.
    ///
    /// The first load happens before this returns; a fetch or parse failure
    /// here is fatal. A zero `reload_interval` disables background reloads.
    pub async fn new(source: Option<&str>, reload_interval: Duration) -> Result<Self, StoreError> {
        let snapshots = Arc::new(SnapshotStore::default());
        let shutdown = Shutdown::new();

        let Some(source) = source else {
            tracing::info!("No sampling strategies source provided, using defaults");
            return Ok(Self {
                snapshots,
                shutdown,
                reloader: Mutex::new(None),
            });
        };

        let source = StrategySource::classify(source);
        let last_applied = initial_load(&source, &snapshots).await?;

        let reloader = if reload_interval.is_zero() {
            None
        } else {
            let task = Reloader::new(source, snapshots.clone(), last_applied);
            Some(tokio::spawn(task.run(reload_interval, shutdown.subscribe())))
        };

        Ok(Self {
            snapshots,
            shutdown,
            reloader: Mutex::new(reloader),
        })
    }

    /// Strategy for `service`, falling back to the default strategy.
    pub fn get_strategy(&self, service: &str) -> Arc<ResolvedStrategy> {
        self.snapshots.strategy_for(service)
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshots.current()
    }

    /// Stop background reloads and wait for the reloader to exit.
    ///
    /// The last published snapshot keeps being served. Safe to call repeatedly.
    pub async fn close(&self) {
        self.shutdown.trigger();

        let handle = self
            .reloader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Sampling strategies reloader task failed");
            }
        }
    }

    /// Whether a background reloader is still attached.
    pub fn is_reloading(&self) -> bool {
        self.shutdown.receiver_count() > 0
    }
}

impl SamplingStrategyProvider for StrategyStore {
    fn get_strategy(&self, service: &str) -> Arc<ResolvedStrategy> {
        StrategyStore::get_strategy(self, service)
    }
}

impl Drop for StrategyStore {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Fetch, parse, resolve and publish once. Returns the applied bytes.
async fn initial_load(
    source: &StrategySource,
    snapshots: &SnapshotStore,
) -> Result<Option<Vec<u8>>, StoreError> {
    let bytes = match source.fetch().await? {
        Fetched::Content(bytes) => bytes,
        Fetched::Unavailable => {
            tracing::info!(source = %source, "Sampling strategies source is unavailable, using defaults");
            return Ok(None);
        }
    };

    let Some(config) = document::parse(&bytes)? else {
        tracing::info!(source = %source, "No sampling strategies provided, using defaults");
        return Ok(None);
    };

    let snapshot = resolver::resolve(&config);
    let services = snapshot.service_count();
    snapshots.publish(snapshot);
    metrics::record_snapshot_services(services);

    tracing::info!(source = %source, services, "Loaded sampling strategies");
    Ok(Some(bytes))
}
