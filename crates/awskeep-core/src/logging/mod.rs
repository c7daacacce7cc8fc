//! Log output for binaries embedding the store
//!
//! The library itself only emits `tracing` events. Call [`init`] once from a
//! binary to print them to stderr; `AWSKEEP_LOG` takes `EnvFilter` directives
//! such as `awskeep_core=debug`.

use tracing_subscriber::{fmt, EnvFilter};

use crate::settings::LOG_ENV;

/// Filter used when `AWSKEEP_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "warn";

/// Install the stderr subscriber with the default filter
///
/// Returns `false` when a global subscriber was already installed.
pub fn init() -> bool {
    init_with_default(DEFAULT_FILTER)
}

/// Install the stderr subscriber, falling back to `default_filter`
pub fn init_with_default(default_filter: &str) -> bool {
    let filter = create_env_filter(default_filter);
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(cfg!(debug_assertions))
        .try_init()
        .is_ok()
}

fn create_env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter))
}
