use std::time::{Duration, Instant};

/// A cached value with its lifetime bounds.
#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    value: V,
    created_at: Instant,
    expires_at: Instant,
    /// Insertion sequence number; orders entries for eviction.
    pub(crate) seq: u64,
}

impl<V> CacheEntry<V> {
    pub(crate) fn new(value: V, ttl: Duration, seq: u64) -> Self {
        let created_at = Instant::now();
        // An unrepresentable deadline means the entry never expires.
        let expires_at = created_at
            .checked_add(ttl)
            .unwrap_or_else(|| created_at + Duration::from_secs(u32::MAX as u64));
        Self {
            value,
            created_at,
            expires_at,
            seq,
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// An entry is live strictly before its expiry instant.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
