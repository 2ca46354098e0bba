//! Immutable strategy snapshots and the atomically swapped cell that holds them.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::strategy::model::ResolvedStrategy;

/// A fully resolved view of all strategies at one point in time.
///
/// Never mutated after construction; a reload builds a new one.
#[derive(Debug, Clone)]
pub struct Snapshot {
    default_strategy: Arc<ResolvedStrategy>,
    service_strategies: HashMap<String, Arc<ResolvedStrategy>>,
}

impl Snapshot {
    pub fn new(
        default_strategy: Arc<ResolvedStrategy>,
        service_strategies: HashMap<String, Arc<ResolvedStrategy>>,
    ) -> Self {
        Self {
            default_strategy,
            service_strategies,
        }
    }

    /// Snapshot served before any configuration has been loaded.
    pub fn bootstrap() -> Self {
        Self::new(Arc::new(ResolvedStrategy::default()), HashMap::new())
    }

    /// Strategy for `service`, or the default strategy when it has no entry.
    pub fn strategy_for(&self, service: &str) -> &Arc<ResolvedStrategy> {
        match self.service_strategies.get(service) {
            Some(strategy) => strategy,
            None => {
                tracing::debug!(service = %service, "Sampling strategy not found, using default");
                &self.default_strategy
            }
        }
    }

    pub fn default_strategy(&self) -> &Arc<ResolvedStrategy> {
        &self.default_strategy
    }

    /// Names of all services with an explicit strategy.
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.service_strategies.keys().map(String::as_str)
    }

    pub fn service_count(&self) -> usize {
        self.service_strategies.len()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::bootstrap()
    }
}

/// Holds the live snapshot.
///
/// Reads are lock-free; `publish` replaces the whole snapshot in one store.
/// Readers holding an older snapshot keep it alive until they drop it.
#[derive(Debug)]
pub struct SnapshotStore {
    current: ArcSwap<Snapshot>,
}

impl SnapshotStore {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// The currently published snapshot.
    pub fn current(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Resolve `service` against the current snapshot without cloning it.
    pub fn strategy_for(&self, service: &str) -> Arc<ResolvedStrategy> {
        Arc::clone(self.current.load().strategy_for(service))
    }

    /// Replace the current snapshot.
    pub fn publish(&self, snapshot: Snapshot) {
        self.current.store(Arc::new(snapshot));
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(Snapshot::bootstrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with(service: &str, rate: f64) -> Snapshot {
        let mut services = HashMap::new();
        services.insert(service.to_string(), Arc::new(ResolvedStrategy::probabilistic(rate)));
        Snapshot::new(Arc::new(ResolvedStrategy::probabilistic(0.5)), services)
    }

    #[test]
    fn test_unknown_service_gets_default() {
        let snapshot = snapshot_with("foo", 0.8);
        assert!(Arc::ptr_eq(snapshot.strategy_for("nope"), snapshot.default_strategy()));
        assert_eq!(snapshot.strategy_for("foo").sampling.probability(), Some(0.8));
        assert_eq!(snapshot.services().collect::<Vec<_>>(), vec!["foo"]);
    }

    #[test]
    fn test_publish_replaces_whole_snapshot() {
        let store = SnapshotStore::default();
        assert_eq!(store.current().service_count(), 0);

        let before = store.current();
        store.publish(snapshot_with("foo", 0.8));

        // Readers that already hold the old snapshot still see it intact.
        assert_eq!(before.service_count(), 0);
        assert_eq!(store.current().service_count(), 1);
        assert_eq!(store.strategy_for("foo").sampling.probability(), Some(0.8));
        assert_eq!(store.strategy_for("bar").sampling.probability(), Some(0.5));
    }

    #[test]
    fn test_concurrent_readers_see_complete_snapshots() {
        let store = Arc::new(SnapshotStore::new(snapshot_with("svc", 0.1)));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..10_000 {
                        let snapshot = store.current();
                        // Every published snapshot holds exactly one service.
                        assert_eq!(snapshot.service_count(), 1);
                        let rate = snapshot.strategy_for("svc").sampling.probability().unwrap();
                        assert!((0.0..=1.0).contains(&rate));
                    }
                })
            })
            .collect();

        for i in 0..1_000 {
            store.publish(snapshot_with("svc", f64::from(i % 10) / 10.0));
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
