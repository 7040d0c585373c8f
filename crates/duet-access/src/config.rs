use serde::{Deserialize, Serialize};

use crate::error::{AccessError, AccessResult};

/// Default number of lines per chunk in the chunked loader.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Default number of chunks kept resident by the chunked loader.
pub const DEFAULT_MAX_RESIDENT_CHUNKS: usize = 5;

/// Default upper bound on the size of a memory-mapped file (10 GiB).
pub const DEFAULT_MAX_MAPPED_SIZE: u64 = 10 * 1024 * 1024 * 1024;

/// Default size above which [`TextLoader::open`](crate::TextLoader::open)
/// prefers the memory-mapped loader (100 MiB).
pub const DEFAULT_MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Configuration for the line loaders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Lines per chunk for the chunked loader.
    pub chunk_size: usize,
    /// Maximum chunks resident at once before LRU eviction.
    pub max_resident_chunks: usize,
    /// Files larger than this are refused by the memory-mapped loader.
    pub max_mapped_size: u64,
    /// Files at or above this size are opened with the memory-mapped loader.
    pub mmap_threshold: u64,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_resident_chunks: DEFAULT_MAX_RESIDENT_CHUNKS,
            max_mapped_size: DEFAULT_MAX_MAPPED_SIZE,
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
        }
    }
}

impl AccessConfig {
    /// Reject settings that would make a loader unable to serve lines.
    pub fn validate(&self) -> AccessResult<()> {
        if self.chunk_size == 0 {
            return Err(AccessError::invalid("chunk_size", "must be at least 1 line"));
        }
        if self.max_resident_chunks == 0 {
            return Err(AccessError::invalid(
                "max_resident_chunks",
                "must keep at least 1 chunk resident",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = AccessConfig::default();
        assert_eq!(c.chunk_size, 10_000);
        assert_eq!(c.max_resident_chunks, 5);
        assert_eq!(c.max_mapped_size, 10 * 1024 * 1024 * 1024);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let c = AccessConfig {
            chunk_size: 0,
            ..Default::default()
        };
        let err = c.validate().unwrap_err();
        assert_eq!(err.kind(), crate::AccessErrorKind::InvalidArgument);
    }

    #[test]
    fn zero_resident_chunks_rejected() {
        let c = AccessConfig {
            max_resident_chunks: 0,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }
}
