//! Path-keyed cache that drops entries whose file content changed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::error::CacheResult;
use crate::fingerprint::{ContentHash, ContentHasher};
use crate::stats::CacheStats;
use crate::store::ExpiringCache;

#[derive(Clone)]
struct Stamped<V> {
    value: V,
    /// `None` if the file could not be read when the entry was stored.
    fingerprint: Option<ContentHash>,
}

/// Fingerprint of a file taken before a value is derived from it.
///
/// Pass it to [`FileCache::set_stamped`] so the entry describes the content
/// that was actually read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileStamp(Option<ContentHash>);

/// An [`ExpiringCache`] keyed by file path.
///
/// Every insert records a BLAKE3 fingerprint of the file. Every lookup
/// re-hashes the file; if the file is gone, unreadable, or its content
/// differs from the stored fingerprint, the entry is invalidated and the
/// lookup is a miss.
pub struct FileCache<V> {
    inner: ExpiringCache<PathBuf, Stamped<V>>,
}

impl<V> FileCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, config: CacheConfig) -> CacheResult<Self> {
        Ok(Self {
            inner: ExpiringCache::new(name, config)?,
        })
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn config(&self) -> &CacheConfig {
        self.inner.config()
    }

    /// Look up `path`, validating the stored fingerprint against the file.
    pub fn try_get(&self, path: &Path) -> Option<V> {
        let Some(stamped) = self.inner.peek(path) else {
            self.inner.record(false);
            return None;
        };

        match (stamped.fingerprint, fingerprint(path)) {
            (Some(stored), Some(current)) if stored == current => {
                self.inner.record(true);
                Some(stamped.value)
            }
            _ => {
                debug!(path = %path.display(), "file content changed, invalidating cache entry");
                self.inner.invalidate(path);
                self.inner.record(false);
                None
            }
        }
    }

    pub fn set(&self, path: &Path, value: V) {
        self.set_with_ttl(path, value, self.inner.config().default_ttl);
    }

    pub fn set_with_ttl(&self, path: &Path, value: V, ttl: Duration) {
        self.store(path, value, self.stamp(path), ttl);
    }

    /// Fingerprint `path` now, ahead of reading it.
    pub fn stamp(&self, path: &Path) -> FileStamp {
        FileStamp(fingerprint(path))
    }

    /// Store `value` under a fingerprint taken earlier with
    /// [`stamp`](Self::stamp).
    pub fn set_stamped(&self, path: &Path, value: V, stamp: FileStamp) {
        self.store(path, value, stamp, self.inner.config().default_ttl);
    }

    fn store(&self, path: &Path, value: V, stamp: FileStamp, ttl: Duration) {
        let stamped = Stamped {
            value,
            fingerprint: stamp.0,
        };
        self.inner.set_with_ttl(path.to_path_buf(), stamped, ttl);
    }

    pub fn get_or_compute<F>(&self, path: &Path, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.try_get(path) {
            return value;
        }
        let stamp = self.stamp(path);
        let value = compute();
        self.set_stamped(path, value.clone(), stamp);
        value
    }

    pub fn try_get_or_compute<F, E>(&self, path: &Path, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.try_get(path) {
            return Ok(value);
        }
        self.try_refresh(path, compute)
    }

    /// Compute and store a value for `path` without looking it up first.
    ///
    /// The file is fingerprinted before `compute` runs, so an edit made while
    /// computing leaves an entry that misses on the next lookup.
    pub fn try_refresh<F, E>(&self, path: &Path, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let stamp = self.stamp(path);
        let value = compute()?;
        self.set_stamped(path, value.clone(), stamp);
        Ok(value)
    }

    pub fn invalidate(&self, path: &Path) -> bool {
        self.inner.invalidate(path)
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn purge_expired(&self) -> usize {
        self.inner.purge_expired()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }

    pub fn reset_stats(&self) {
        self.inner.reset_stats();
    }
}

impl<V> std::fmt::Debug for FileCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FileCache").field(&self.inner).finish()
    }
}

fn fingerprint(path: &Path) -> Option<ContentHash> {
    match ContentHasher::FILE.hash_file(path) {
        Ok(hash) => Some(hash),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot fingerprint file");
            None
        }
    }
}
