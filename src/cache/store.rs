//! In-memory store for compiled MDX documents.

use std::sync::{Arc, RwLock};

use lru::LruCache;
use metrics::counter;

use crate::application::render::CompiledDocument;

use super::config::CacheConfig;
use super::keys::IdentityKey;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

const METRIC_RENDER_CACHE_HIT_TOTAL: &str = "mdx_render_cache_hit_total";
const METRIC_RENDER_CACHE_MISS_TOTAL: &str = "mdx_render_cache_miss_total";
const METRIC_RENDER_CACHE_EVICT_TOTAL: &str = "mdx_render_cache_evict_total";

/// Compiled documents keyed by identity key, bounded with LRU eviction.
///
/// Only documents that passed the syntax guard are ever inserted; the render
/// service is the sole writer. Construct one per process (or per test) and
/// share it behind an `Arc`.
pub struct RenderCache {
    enabled: bool,
    entries: RwLock<LruCache<IdentityKey, Arc<CompiledDocument>>>,
}

impl RenderCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            enabled: config.enabled,
            entries: RwLock::new(LruCache::new(config.capacity_non_zero())),
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Looks up a document and marks it most recently used.
    pub fn get(&self, key: &IdentityKey) -> Option<Arc<CompiledDocument>> {
        if !self.enabled {
            return None;
        }

        // LRU lookups reorder entries, so reads take the write lock.
        let hit = rw_write(&self.entries, SOURCE, "get").get(key).cloned();
        match hit {
            Some(_) => counter!(METRIC_RENDER_CACHE_HIT_TOTAL).increment(1),
            None => counter!(METRIC_RENDER_CACHE_MISS_TOTAL).increment(1),
        }
        hit
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.enabled && rw_read(&self.entries, SOURCE, "contains").contains(key)
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        rw_read(&self.entries, SOURCE, "capacity").cap().get()
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Stores a document, replacing any entry under the same key.
    ///
    /// Returns the key evicted to make room, if any.
    pub fn insert(
        &self,
        key: IdentityKey,
        document: Arc<CompiledDocument>,
    ) -> Option<IdentityKey> {
        if !self.enabled {
            return None;
        }

        let displaced = rw_write(&self.entries, SOURCE, "insert").push(key.clone(), document);
        match displaced {
            Some((evicted, _)) if evicted != key => {
                counter!(METRIC_RENDER_CACHE_EVICT_TOTAL).increment(1);
                Some(evicted)
            }
            _ => None,
        }
    }

    pub fn invalidate(&self, key: &IdentityKey) -> bool {
        rw_write(&self.entries, SOURCE, "invalidate")
            .pop(key)
            .is_some()
    }

    pub fn clear(&self) {
        rw_write(&self.entries, SOURCE, "clear").clear();
    }
}
