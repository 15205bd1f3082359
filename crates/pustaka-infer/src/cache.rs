//! LRU cache for per-document feature vectors.
//!
//! Keyed by content hash so unchanged text is never re-vectorized.
//! Default: 1000 entries, 1-hour TTL.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use pustaka_core::SimilarityConfig;

use crate::features::FeatureVector;

/// Cached feature entry with timestamp.
struct CacheEntry {
    features: FeatureVector,
    inserted_at: Instant,
}

/// Thread-safe LRU feature cache.
pub struct FeatureCache {
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    order: Vec<String>,
    max_size: usize,
    ttl: Duration,
}

impl FeatureCache {
    /// Create a new cache with the given capacity and TTL.
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        let max_size = max_size.max(1);
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::with_capacity(max_size),
                order: Vec::with_capacity(max_size),
                max_size,
                ttl,
            }),
        }
    }

    pub fn from_config(config: &SimilarityConfig) -> Self {
        Self::new(
            config.feature_cache_size,
            Duration::from_secs(config.feature_cache_ttl_secs),
        )
    }

    /// Get cached features. Returns None on miss or expired entry.
    pub fn get(&self, content_hash: &str) -> Option<FeatureVector> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let expired = inner
            .entries
            .get(content_hash)
            .map(|e| e.inserted_at.elapsed() >= inner.ttl)?;

        if expired {
            inner.entries.remove(content_hash);
            inner.order.retain(|k| k != content_hash);
            return None;
        }

        if let Some(pos) = inner.order.iter().position(|k| k == content_hash) {
            let key = inner.order.remove(pos);
            inner.order.push(key);
        }
        inner.entries.get(content_hash).map(|e| e.features.clone())
    }

    /// Insert features into the cache.
    pub fn put(&self, content_hash: String, features: FeatureVector) {
        let mut inner = self.inner.lock();

        if inner.entries.contains_key(&content_hash) {
            inner.order.retain(|k| k != &content_hash);
        } else {
            // Evict oldest if at capacity
            while inner.entries.len() >= inner.max_size && !inner.order.is_empty() {
                let oldest = inner.order.remove(0);
                inner.entries.remove(&oldest);
            }
        }

        inner.order.push(content_hash.clone());
        inner.entries.insert(
            content_hash,
            CacheEntry {
                features,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of entries in the cache.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all entries.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }
}

impl Default for FeatureCache {
    fn default() -> Self {
        Self::from_config(&SimilarityConfig::default())
    }
}
