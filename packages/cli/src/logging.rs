//! Log output
//!
//! Installs a `tracing-subscriber` formatter writing to stderr. The filter
//! is read from `QUILL_LOG` and defaults to `warn`.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "QUILL_LOG";
pub const DEFAULT_FILTER: &str = "warn";

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
