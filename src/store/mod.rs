//! Strategy storage and refresh subsystem.
//!
//! # Data Flow
//! ```text
//! source.rs (file read / HTTP GET)
//!     → raw bytes
//!     → strategy::document (parse) → strategy::resolver (resolve)
//!     → snapshot.rs (atomic publish of an immutable Snapshot)
//!     ← get_strategy() readers (lock-free load)
//!
//! reloader.rs drives the same pipeline on a timer after startup and is
//! the only writer once the store is constructed.
//! ```

pub mod reloader;
pub mod snapshot;
pub mod source;
pub mod strategy_store;

use std::sync::Arc;

use crate::strategy::model::ResolvedStrategy;

pub use snapshot::{Snapshot, SnapshotStore};
pub use strategy_store::{StoreError, StrategyStore};

/// Read side of the store, as consumed by request handlers.
///
/// Lookups never fail: unknown services get the default strategy.
pub trait SamplingStrategyProvider: Send + Sync {
    fn get_strategy(&self, service: &str) -> Arc<ResolvedStrategy>;
}
