use serde::Serialize;

/// Point-in-time counters of one cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped to make room for new ones.
    pub evictions: u64,
    /// Expired entries removed by sweeps or `purge_expired`.
    pub expirations: u64,
    /// Entries currently held, expired ones included until swept.
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Hit rate as a fraction in `[0.0, 1.0]`; zero before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }
}
