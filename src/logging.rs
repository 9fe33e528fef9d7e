//! Tracing subscriber setup for hosts without their own.
//!
//! The engine only emits `tracing` events; installing a subscriber is the
//! host's choice. The filter is read from `HUMANBOARD_DND_LOG` and falls
//! back to `warn`, e.g.:
//!
//! ```text
//! HUMANBOARD_DND_LOG=humanboard_dnd=debug
//! HUMANBOARD_DND_LOG=humanboard_dnd::drag=trace,warn
//! ```

use crate::constants::{DEFAULT_LOG_FILTER, LOG_ENV_VAR};
use crate::error::{DndError, DndResult};
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install a global formatting subscriber. Fails if one is already set.
pub fn try_init() -> DndResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .try_init()
        .map_err(|err| DndError::Other(format!("Failed to install subscriber: {err}")))
}

/// Install a global subscriber, ignoring an already installed one.
pub fn init() {
    let _ = try_init();
}

/// Subscriber for tests: output is captured per test by the harness.
pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_test_writer()
        .try_init();
}
