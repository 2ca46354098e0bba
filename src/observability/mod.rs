//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! strategy resolver / reloader / http
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (reload counters, snapshot gauge)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
