//! `tracing` subscriber setup.
//!
//! Log lines go to stderr so that command output on stdout stays clean.
//! The level comes from `--log-level`; `RUST_LOG` takes precedence when set.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber.
///
/// `level` is any `EnvFilter` directive, e.g. `"debug"` or
/// `"oid_explorer=trace,sqlx=warn"`.
pub fn init(level: &str) -> Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.is_empty() => EnvFilter::new(directives),
        _ => EnvFilter::try_new(level).with_context(|| format!("invalid log level: {}", level))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {}", e))
}
