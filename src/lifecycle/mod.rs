//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load strategies → Start reloader → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop HTTP server → Stop reloader → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
