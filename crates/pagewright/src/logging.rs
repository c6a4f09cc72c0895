//! Log subscriber setup for test harnesses.
//!
//! The library only emits `tracing` events. Harnesses that want to see them
//! call [`init`] (human-readable) or [`init_json`] (one JSON object per line,
//! for CI log collectors) once at startup. Both are safe to call from every
//! test: only the first call installs a subscriber.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives
pub const LOG_ENV: &str = "PAGEWRIGHT_LOG";

/// Directives used when [`LOG_ENV`] is unset or invalid
pub const DEFAULT_DIRECTIVES: &str = "warn";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install a fmt subscriber writing through the test capture.
///
/// Returns `false` when a global subscriber was already set.
pub fn init() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_test_writer()
        .try_init()
        .is_ok()
}

/// Install a JSON subscriber writing through the test capture.
///
/// Returns `false` when a global subscriber was already set.
pub fn init_json() -> bool {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter())
        .with_test_writer()
        .try_init()
        .is_ok()
}
