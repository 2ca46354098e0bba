//! Periodic reload of the strategies document.
//!
//! # State machine
//! ```text
//! Idle ──tick──▶ Fetching ──┬─ fetch error ──────────────▶ Idle (log, keep snapshot)
//!                           ├─ 503 / null document ──────▶ Idle (keep snapshot)
//!                           ├─ same bytes as last apply ─▶ Idle (no parse)
//!                           └─ new bytes ─▶ Resolving ─┬─ parse error ─▶ Idle (log, keep snapshot)
//!                                                      └─ Publishing ──▶ Idle
//! ```
//!
//! Shutdown is only observed between ticks, so a fetch/resolve/publish
//! sequence that has started always finishes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::observability::metrics;
use crate::store::snapshot::SnapshotStore;
use crate::store::source::{Fetched, StrategySource};
use crate::strategy::{document, resolver};

/// What a single reload attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// A new snapshot was published.
    Applied,
    /// The fetched bytes matched the last applied document.
    Unchanged,
    /// The source had nothing to offer (503 or a `null` document).
    Unavailable,
    /// Fetching failed; the previous snapshot stays.
    FetchFailed,
    /// The document did not parse; the previous snapshot stays.
    ParseFailed,
}

impl ReloadOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReloadOutcome::Applied => "applied",
            ReloadOutcome::Unchanged => "unchanged",
            ReloadOutcome::Unavailable => "unavailable",
            ReloadOutcome::FetchFailed => "fetch_failed",
            ReloadOutcome::ParseFailed => "parse_failed",
        }
    }
}

/// The single writer of a [`SnapshotStore`] after startup.
pub struct Reloader {
    source: StrategySource,
    snapshots: Arc<SnapshotStore>,
    /// Raw bytes of the last document that was published.
    last_applied: Option<Vec<u8>>,
}

impl Reloader {
    pub fn new(
        source: StrategySource,
        snapshots: Arc<SnapshotStore>,
        last_applied: Option<Vec<u8>>,
    ) -> Self {
        Self {
            source,
            snapshots,
            last_applied,
        }
    }

    /// Run one fetch/compare/resolve/publish cycle.
    pub async fn reload(&mut self) -> ReloadOutcome {
        let outcome = self.try_reload().await;
        metrics::record_reload(outcome.as_str());
        outcome
    }

    async fn try_reload(&mut self) -> ReloadOutcome {
        let bytes = match self.source.fetch().await {
            Ok(Fetched::Content(bytes)) => bytes,
            Ok(Fetched::Unavailable) => {
                tracing::debug!(source = %self.source, "Sampling strategies unavailable, keeping current");
                return ReloadOutcome::Unavailable;
            }
            Err(e) => {
                tracing::error!(source = %self.source, error = %e, "Failed to re-load sampling strategies");
                return ReloadOutcome::FetchFailed;
            }
        };

        if self.last_applied.as_deref() == Some(bytes.as_slice()) {
            return ReloadOutcome::Unchanged;
        }

        let config = match document::parse(&bytes) {
            Ok(Some(config)) => config,
            Ok(None) => return ReloadOutcome::Unavailable,
            Err(e) => {
                tracing::error!(source = %self.source, error = %e, "Failed to update sampling strategies");
                return ReloadOutcome::ParseFailed;
            }
        };

        let snapshot = resolver::resolve(&config);
        let services = snapshot.service_count();
        self.snapshots.publish(snapshot);
        metrics::record_snapshot_services(services);

        tracing::info!(
            source = %self.source,
            services,
            document = %String::from_utf8_lossy(&bytes),
            "Updated sampling strategies"
        );
        self.last_applied = Some(bytes);
        ReloadOutcome::Applied
    }

    /// Reload every `interval` until `shutdown` fires or its sender is dropped.
    pub async fn run(mut self, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            source = %self.source,
            interval_ms = interval.as_millis() as u64,
            "Sampling strategies reloader starting"
        );

        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        // A slow fetch pushes the next attempt back rather than bursting.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Sampling strategies reloader received shutdown signal, exiting loop");
                    break;
                }
                _ = ticker.tick() => {
                    self.reload().await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "reloader-{}-{}.json",
            name,
            std::process::id()
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_reload_applies_then_skips_identical_bytes() {
        let path = temp_file("identical", r#"{"default_strategy":{"type":"probabilistic","param":0.3}}"#);
        let snapshots = Arc::new(SnapshotStore::default());
        let mut reloader = Reloader::new(StrategySource::File(path.clone()), snapshots.clone(), None);

        assert_eq!(reloader.reload().await, ReloadOutcome::Applied);
        let first = snapshots.strategy_for("any");
        assert_eq!(first.sampling.probability(), Some(0.3));

        assert_eq!(reloader.reload().await, ReloadOutcome::Unchanged);
        assert!(Arc::ptr_eq(&first, &snapshots.strategy_for("any")));

        std::fs::remove_file(path).unwrap_or_default();
    }

    #[tokio::test]
    async fn test_whitespace_change_triggers_reparse() {
        let path = temp_file("whitespace", r#"{"default_strategy":{"type":"probabilistic","param":0.3}}"#);
        let snapshots = Arc::new(SnapshotStore::default());
        let mut reloader = Reloader::new(StrategySource::File(path.clone()), snapshots.clone(), None);
        assert_eq!(reloader.reload().await, ReloadOutcome::Applied);
        let first = snapshots.strategy_for("any");

        std::fs::write(&path, "{\"default_strategy\": {\"type\":\"probabilistic\",\"param\":0.3}}\n").unwrap();
        assert_eq!(reloader.reload().await, ReloadOutcome::Applied);
        let second = snapshots.strategy_for("any");
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);

        std::fs::remove_file(path).unwrap_or_default();
    }

    #[tokio::test]
    async fn test_parse_failure_keeps_previous_snapshot() {
        let path = temp_file("broken", r#"{"default_strategy":{"type":"probabilistic","param":0.3}}"#);
        let snapshots = Arc::new(SnapshotStore::default());
        let mut reloader = Reloader::new(StrategySource::File(path.clone()), snapshots.clone(), None);
        assert_eq!(reloader.reload().await, ReloadOutcome::Applied);
        let before = snapshots.current();

        std::fs::write(&path, "{ this is not json").unwrap();
        assert_eq!(reloader.reload().await, ReloadOutcome::ParseFailed);
        assert!(Arc::ptr_eq(&before, &snapshots.current()));

        std::fs::remove_file(&path).unwrap_or_default();
        assert_eq!(reloader.reload().await, ReloadOutcome::FetchFailed);
        assert!(Arc::ptr_eq(&before, &snapshots.current()));
    }

    #[tokio::test]
    async fn test_null_document_is_not_applied() {
        let path = temp_file("null", "null");
        let snapshots = Arc::new(SnapshotStore::default());
        let before = snapshots.current();
        let mut reloader = Reloader::new(StrategySource::File(path.clone()), snapshots.clone(), None);

        assert_eq!(reloader.reload().await, ReloadOutcome::Unavailable);
        assert!(Arc::ptr_eq(&before, &snapshots.current()));

        std::fs::remove_file(path).unwrap_or_default();
    }

    #[tokio::test]
    async fn test_run_exits_on_shutdown() {
        let path = temp_file("run", "{}");
        let snapshots = Arc::new(SnapshotStore::default());
        let reloader = Reloader::new(StrategySource::File(path.clone()), snapshots, None);
        let (tx, rx) = broadcast::channel(1);

        let handle = tokio::spawn(reloader.run(Duration::from_millis(10), rx));
        time::sleep(Duration::from_millis(50)).await;
        tx.send(()).unwrap();

        time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("reloader did not stop")
            .unwrap();

        std::fs::remove_file(path).unwrap_or_default();
    }
}
