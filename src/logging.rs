//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `--verbose` flag (`debug` for this crate)
//! 2. `DOCKRUN_LOG` environment variable (any `EnvFilter` directive)
//! 3. default to `warn`
//!
//! Logs always go to stderr so they never mix with passed-through output.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "DOCKRUN_LOG";

/// Initialise the global logging subscriber. Call once at startup.
pub fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let filter = build_filter(verbose, std::env::var(LOG_ENV).ok().as_deref())?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))
}

fn build_filter(verbose: bool, env_directive: Option<&str>) -> Result<EnvFilter> {
    if verbose {
        return Ok(EnvFilter::new("dockrun=debug"));
    }

    match env_directive {
        Some(directive) if !directive.trim().is_empty() => EnvFilter::try_new(directive)
            .with_context(|| format!("Invalid {} filter '{}'", LOG_ENV, directive)),
        _ => Ok(EnvFilter::new("warn")),
    }
}
