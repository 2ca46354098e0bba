//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//! ```
//!
//! This is the process configuration. The strategies document itself is
//! loaded and hot-reloaded by the `store` subsystem.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, HttpConfig, LogFormat, ObservabilityConfig, StrategiesConfig};
pub use validation::{validate_config, ValidationError};
