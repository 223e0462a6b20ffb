use std::num::NonZeroUsize;

use lru::LruCache;
use tokio::sync::RwLock;

use crate::types::Script;

// ==============================================================================
// Auxiliary Data Cache
// ==============================================================================

/// Bounded LRU caches for datums and scripts, keyed by hash.
///
/// Content-addressed data never changes, so entries only need eviction, never
/// invalidation. Absent lookups are not cached: the indexer may learn about
/// the hash later.
pub struct AuxCache {
    datums: Option<RwLock<LruCache<String, String>>>,
    scripts: Option<RwLock<LruCache<String, Script>>>,
}

impl AuxCache {
    /// A cache holding up to `capacity` datums and `capacity` scripts.
    /// A capacity of zero disables caching.
    pub fn new(capacity: usize) -> Self {
        match NonZeroUsize::new(capacity) {
            Some(cap) => Self {
                datums: Some(RwLock::new(LruCache::new(cap))),
                scripts: Some(RwLock::new(LruCache::new(cap))),
            },
            None => Self::disabled(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            datums: None,
            scripts: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.datums.is_some()
    }

    // `LruCache::get` promotes the entry, so lookups take the write lock.
    pub async fn get_datum(&self, hash: &str) -> Option<String> {
        let cache = self.datums.as_ref()?;
        cache.write().await.get(hash).cloned()
    }

    pub async fn insert_datum(&self, hash: &str, datum: String) {
        if let Some(cache) = &self.datums {
            cache.write().await.put(hash.to_owned(), datum);
        }
    }

    pub async fn get_script(&self, hash: &str) -> Option<Script> {
        let cache = self.scripts.as_ref()?;
        cache.write().await.get(hash).cloned()
    }

    pub async fn insert_script(&self, hash: &str, script: Script) {
        if let Some(cache) = &self.scripts {
            cache.write().await.put(hash.to_owned(), script);
        }
    }
}

impl Default for AuxCache {
    fn default() -> Self {
        Self::new(1024)
    }
}
