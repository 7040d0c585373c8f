use std::io;

use duet_access::{AccessError, AccessErrorKind};
use duet_cache::CacheError;
use duet_diff::DiffError;
use duet_structure::StructureError;
use thiserror::Error;

/// Failure classes shared by every Duet error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller error; retrying with the same arguments fails again.
    InvalidArgument,
    /// A file to open does not exist.
    NotFound,
    /// A resource guard refused the request.
    ResourceLimit,
    /// Reading failed; reopen the file to retry.
    IoFailure,
    /// A document is empty or malformed.
    InvalidInput,
}

impl From<AccessErrorKind> for ErrorKind {
    fn from(kind: AccessErrorKind) -> Self {
        match kind {
            AccessErrorKind::InvalidArgument => Self::InvalidArgument,
            AccessErrorKind::NotFound => Self::NotFound,
            AccessErrorKind::ResourceLimit => Self::ResourceLimit,
            AccessErrorKind::IoFailure => Self::IoFailure,
        }
    }
}

#[derive(Debug, Error)]
pub enum DuetError {
    #[error("access error: {0}")]
    Access(#[from] AccessError),

    #[error("diff error: {0}")]
    Diff(#[from] DiffError),

    #[error("structure error: {0}")]
    Structure(#[from] StructureError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl DuetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Access(e) => e.kind().into(),
            Self::Diff(e) => e.kind().into(),
            Self::Structure(_) => ErrorKind::InvalidInput,
            Self::Cache(CacheError::InvalidConfig { .. }) | Self::Config(_) => {
                ErrorKind::InvalidArgument
            }
            Self::Cache(CacheError::Io(_)) => ErrorKind::IoFailure,
            Self::Io(e) if e.kind() == io::ErrorKind::NotFound => ErrorKind::NotFound,
            Self::Io(_) => ErrorKind::IoFailure,
        }
    }
}

pub type DuetResult<T> = Result<T, DuetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_source_error() {
        let err: DuetError = AccessError::NotFound("x".into()).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: DuetError = StructureError::MissingRoot.into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err: DuetError = CacheError::InvalidConfig {
            name: "capacity",
            reason: "zero".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err: DuetError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
