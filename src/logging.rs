//! Tracing subscriber setup.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Pick the filter directive: `RUST_LOG` wins, then `-v` flags, then the
/// configured default.
pub fn filter_directive(configured: &str, verbosity: u8) -> String {
    if let Ok(env) = std::env::var(EnvFilter::DEFAULT_ENV) {
        if !env.trim().is_empty() {
            return env;
        }
    }
    match verbosity {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global fmt subscriber. Logs go to stderr so `--once`
/// output on stdout stays clean.
pub fn init(configured: &str, verbosity: u8) -> Result<()> {
    let directive = filter_directive(configured, verbosity);
    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| anyhow!("Invalid log filter '{}': {}", directive, e))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))
}
