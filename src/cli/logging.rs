//! Logging setup using `tracing` + `tracing-subscriber`
//!
//! Level priority:
//! 1. `--verbose` (debug for this crate)
//! 2. `WORKPLAN_LOG` environment filter (e.g. "debug", "workplan=trace")
//! 3. default to `warn`
//!
//! Logs go to stderr so stdout stays clean for command output.

use tracing_subscriber::{fmt, EnvFilter};

const LOG_ENV: &str = "WORKPLAN_LOG";

fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("workplan=debug");
    }

    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Installs the global subscriber
///
/// Only the first call takes effect.
pub fn init(verbose: bool) {
    let installed = fmt()
        .with_env_filter(filter(verbose))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();

    if installed.is_err() {
        tracing::trace!("logging already initialised");
    }
}
