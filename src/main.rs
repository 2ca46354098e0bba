//! Sampling strategy store service.
//!
//! Loads a sampling strategies document from a file or URL, keeps it fresh
//! in the background and answers `GET /sampling?service=<name>`.

use std::path::PathBuf;

use clap::Parser;

use sampling_strategy_store::config::{self, AppConfig};
use sampling_strategy_store::lifecycle::startup;
use sampling_strategy_store::observability::logging;

#[derive(Parser)]
#[command(name = "sampling-strategy-store")]
#[command(about = "Serves per-service sampling strategies", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "SAMPLING_CONFIG")]
    config: Option<PathBuf>,

    /// Strategies document: a file path or an http(s) URL.
    #[arg(short, long)]
    strategies: Option<String>,

    /// Seconds between reloads of the strategies document (0 disables).
    #[arg(long)]
    reload_interval_secs: Option<u64>,

    /// HTTP bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

impl Cli {
    /// Load the file (if any), apply flag overrides, then validate the result.
    fn resolve_config(&self) -> Result<AppConfig, config::ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load_config(path)?,
            None => AppConfig::default(),
        };
        self.apply(&mut config);
        config::validate_config(&config).map_err(config::ConfigError::Validation)?;
        Ok(config)
    }

    fn apply(&self, config: &mut AppConfig) {
        if let Some(source) = &self.strategies {
            config.strategies.source = Some(source.clone());
        }
        if let Some(secs) = self.reload_interval_secs {
            config.strategies.reload_interval_secs = secs;
        }
        if let Some(bind) = &self.bind {
            config.http.bind_address = bind.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = cli.resolve_config()?;

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        source = config.strategies.source.as_deref().unwrap_or("<defaults>"),
        reload_interval_secs = config.strategies.reload_interval_secs,
        bind_address = %config.http.bind_address,
        "sampling-strategy-store starting"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
