//! Error types for the cache crate.

use std::io;

/// Errors that can occur when building a cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A configuration value was out of range.
    #[error("invalid cache configuration `{name}`: {reason}")]
    InvalidConfig { name: &'static str, reason: String },

    /// The background sweeper thread could not be started.
    #[error("failed to start sweeper thread: {0}")]
    Io(#[from] io::Error),
}

/// Convenience alias for cache results.
pub type CacheResult<T> = Result<T, CacheError>;
