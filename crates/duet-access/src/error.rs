//! Error types for the access layer.

use std::io;
use std::path::PathBuf;

/// Broad classification of access failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessErrorKind {
    /// The caller passed an argument the loader cannot honour.
    InvalidArgument,
    /// The file does not exist.
    NotFound,
    /// A resource guard (such as the maximum mappable size) was tripped.
    ResourceLimit,
    /// Reading the file failed; the loader must be reconstructed.
    IoFailure,
}

/// Errors produced by line loaders.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// The file to open does not exist.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// An argument was out of the accepted range.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// The file is larger than the configured mapping limit.
    #[error("file {path} is {size} bytes, exceeding the maximum of {max} bytes")]
    FileTooLarge { path: PathBuf, size: u64, max: u64 },

    /// I/O error while scanning or reading the file.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// An earlier index build failed and the loader can no longer serve lines.
    #[error("loader for {path} is unusable after a failed index build: {reason}")]
    Unusable { path: PathBuf, reason: String },
}

impl AccessError {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> AccessErrorKind {
        match self {
            Self::NotFound(_) => AccessErrorKind::NotFound,
            Self::InvalidArgument { .. } => AccessErrorKind::InvalidArgument,
            Self::FileTooLarge { .. } => AccessErrorKind::ResourceLimit,
            Self::Io(_) | Self::Unusable { .. } => AccessErrorKind::IoFailure,
        }
    }

    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

/// Result alias for access-layer operations.
pub type AccessResult<T> = Result<T, AccessError>;
