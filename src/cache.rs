use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Lifetime of cached search responses and page contents.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: Instant,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.timestamp.elapsed() < ttl
    }
}

/// Keyed store with a uniform time-to-live.
///
/// Expiry is lazy: a stale entry is only dropped when `get` runs into it.
/// There is no size bound and no background sweeper.
#[derive(Debug)]
pub struct TtlCache<T> {
    entries: DashMap<String, CacheEntry<T>>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> TtlCache<T> {
        TtlCache {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &str) -> Option<T> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_fresh(self.ttl) {
                return Some(entry.data.clone());
            }
        }
        // the read guard must be gone before touching the shard again
        let ttl = self.ttl;
        self.entries.remove_if(key, |_, entry| !entry.is_fresh(ttl));
        None
    }

    pub fn put(&self, key: impl Into<String>, data: T) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                data,
                timestamp: Instant::now(),
            },
        );
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
