//! Logging setup for applications embedding Duet.
//!
//! The library crates only emit `tracing` events; nothing is printed until
//! the host installs a subscriber. This module installs a plain `fmt`
//! subscriber filtered by `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber with [`DEFAULT_DIRECTIVE`] as fallback.
///
/// Returns `false` if a subscriber was already installed; calling this more
/// than once is harmless.
pub fn init_logging() -> bool {
    init_logging_with(DEFAULT_DIRECTIVE)
}

/// Install the global subscriber, falling back to `directive` when
/// `RUST_LOG` does not yield a filter.
pub fn init_logging_with(directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
