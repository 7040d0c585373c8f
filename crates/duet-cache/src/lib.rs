//! Bounded, expiring caches for Duet.
//!
//! [`ExpiringCache`] is one generic store used for every value shape: it is
//! capped by entry count (evicting the oldest insert first), expires entries
//! by TTL, and owns an optional background sweeper thread. [`FileCache`]
//! wraps it for path-keyed values and drops entries whose file content no
//! longer matches the BLAKE3 fingerprint taken at insert time.

pub mod config;
pub mod entry;
pub mod error;
pub mod file;
pub mod fingerprint;
pub mod stats;
pub mod store;
mod sweeper;

pub use config::CacheConfig;
pub use entry::CacheEntry;
pub use error::{CacheError, CacheResult};
pub use file::{FileCache, FileStamp};
pub use fingerprint::{ContentHash, ContentHasher};
pub use stats::CacheStats;
pub use store::ExpiringCache;
