//! Error types for the diff crate.

use duet_access::{AccessError, AccessErrorKind};

/// Errors that can occur during diff operations.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A configuration value was out of range.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// Reading lines from a loader failed.
    #[error("access error: {0}")]
    Access(#[from] AccessError),
}

impl DiffError {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> AccessErrorKind {
        match self {
            Self::InvalidArgument { .. } => AccessErrorKind::InvalidArgument,
            Self::Access(e) => e.kind(),
        }
    }
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
