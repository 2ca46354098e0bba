//! Sampling strategy store.
//!
//! Resolves a sampling strategies document (a default strategy plus
//! per-service and per-operation overrides) into an immutable snapshot,
//! serves lock-free lookups from it and swaps in new snapshots as the
//! document changes.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod store;
pub mod strategy;

pub use store::{SamplingStrategyProvider, StrategyStore};
pub use strategy::model::ResolvedStrategy;
