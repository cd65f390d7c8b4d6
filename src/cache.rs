//! TTL-based caching for slow-changing reference lists.
//!
//! Department and semester lists change once a term at most; the cache
//! spares a round trip per page-load-equivalent without any invalidation
//! protocol beyond expiry.

use dashmap::DashMap;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct CachedList {
    values: Vec<String>,
    cached_at: Instant,
    ttl: Duration,
}

/// Thread-safe cache keyed by reference-list name.
pub struct ReferenceCache {
    entries: DashMap<&'static str, CachedList>,
    default_ttl: Duration,
}

impl ReferenceCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
        }
    }

    /// 10-minute default TTL.
    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(10 * 60))
    }

    /// Gets a cached list if present and unexpired.
    pub fn get(&self, key: &'static str) -> Option<Vec<String>> {
        self.entries.get(key).and_then(|entry| {
            if entry.cached_at.elapsed() < entry.ttl {
                Some(entry.values.clone())
            } else {
                // expired, evict on the way out
                drop(entry);
                self.entries.remove(key);
                None
            }
        })
    }

    pub fn insert(&self, key: &'static str, values: Vec<String>) {
        self.insert_with_ttl(key, values, self.default_ttl);
    }

    pub fn insert_with_ttl(&self, key: &'static str, values: Vec<String>, ttl: Duration) {
        self.entries.insert(
            key,
            CachedList {
                values,
                cached_at: Instant::now(),
                ttl,
            },
        );
    }

    pub fn invalidate(&self, key: &'static str) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ReferenceCache {
    fn default() -> Self {
        Self::with_default_ttl()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let cache = ReferenceCache::with_default_ttl();
        cache.insert("departments", vec!["護理系".to_string()]);
        assert_eq!(cache.get("departments").unwrap(), ["護理系"]);
        assert!(cache.get("semesters").is_none());
    }

    #[test]
    fn test_expiry_evicts() {
        let cache = ReferenceCache::new(Duration::from_millis(0));
        cache.insert("semesters", vec!["113-1".to_string()]);
        // zero TTL expires immediately
        assert!(cache.get("semesters").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate() {
        let cache = ReferenceCache::with_default_ttl();
        cache.insert("departments", vec!["資管系".to_string()]);
        cache.invalidate("departments");
        assert!(cache.get("departments").is_none());
    }
}
