//! Logging setup.
//!
//! Filter precedence:
//! - `DCC_LOG_LEVEL`: level or filter directive (`info`, `dcc_core=debug`, ...)
//! - `RUST_LOG`: standard filter override
//! - `debug` when verbose, else `info`
//!
//! Logs go to stderr so streamed run output on stdout stays clean.

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

pub const LOG_LEVEL_ENV: &str = "DCC_LOG_LEVEL";

static INIT: OnceLock<()> = OnceLock::new();

fn resolve_env_filter(verbose: bool) -> EnvFilter {
    if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
        if let Ok(filter) = EnvFilter::try_new(level) {
            return filter;
        }
    }
    let fallback = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install the global fmt subscriber once per process.
///
/// Later calls are no-ops, as is a call made after another subscriber was
/// installed elsewhere.
pub fn init_tracing(verbose: bool) {
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(resolve_env_filter(verbose))
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_tracing(false);
        init_tracing(true);
        tracing::info!("still logging after repeated init");
    }
}
