//! Sampling strategy model, parsing and resolution.
//!
//! # Data Flow
//! ```text
//! raw JSON bytes
//!     → document.rs (serde schema → StrategyConfig, `type` strings → Strategy)
//!     → resolver.rs (defaults, operation overrides, merge → Snapshot)
//! ```
//!
//! Both stages are pure; all I/O lives in `store`.

pub mod document;
pub mod model;
pub mod resolver;

pub use document::{parse, ParseError};
pub use model::{
    OperationProbability, PerOperationStrategies, ResolvedStrategy, Sampling, Strategy,
    StrategyConfig, DEFAULT_SAMPLING_PROBABILITY,
};
pub use resolver::resolve;
