//! Diagnostic logging for binaries embedding this crate.
//!
//! Everything goes to stderr so structured output on stdout stays clean.

use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "shots_review=info";
const VERBOSE_LOG_FILTER: &str = "shots_review=debug";

/// Logging configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogConfig {
    /// Debug-level output for this crate when `RUST_LOG` is unset.
    pub verbose: bool,
    /// Colored output; turn off when stderr is captured.
    pub ansi: bool,
}

/// Build the filter: `RUST_LOG` wins, otherwise the crate default.
pub fn env_filter(config: LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config.verbose {
            EnvFilter::new(VERBOSE_LOG_FILTER)
        } else {
            EnvFilter::new(DEFAULT_LOG_FILTER)
        }
    })
}

/// Install a stderr subscriber. Fails if a global subscriber is already set.
pub fn init_logging(config: LogConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(config.ansi)
                .with_target(false)
                .with_filter(env_filter(config)),
        )
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
