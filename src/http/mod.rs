//! HTTP query surface.
//!
//! # Data Flow
//! ```text
//! GET /sampling?service=foo
//!     → server.rs (Axum handler, trace + timeout layers)
//!     → SamplingStrategyProvider::get_strategy
//!     → response.rs (camelCase JSON)
//! ```

pub mod response;
pub mod server;

pub use response::SamplingStrategyResponse;
pub use server::HttpServer;
