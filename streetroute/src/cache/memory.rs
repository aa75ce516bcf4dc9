//! In-memory image cache using moka.
//!
//! Entries are keyed by resource locator and weighted by byte length, so the
//! capacity is a memory bound rather than an entry count. Moka evicts least
//! recently used entries once the bound is exceeded.

use bytes::Bytes;
use moka::future::Cache as MokaCache;

/// Default cache capacity (256 MB).
pub const DEFAULT_CACHE_SIZE_BYTES: u64 = 256 * 1024 * 1024;

/// Bounded byte cache shared by the resolver and the exporter.
///
/// Cloning is cheap; clones share the same storage.
#[derive(Clone)]
pub struct ImageCache {
    cache: MokaCache<String, Bytes>,
    max_size_bytes: u64,
}

impl ImageCache {
    /// Create a cache holding at most `max_size_bytes` of image data.
    pub fn new(max_size_bytes: u64) -> Self {
        let cache = MokaCache::builder()
            .weigher(|_key: &String, value: &Bytes| -> u32 {
                value.len().min(u32::MAX as usize) as u32
            })
            .max_capacity(max_size_bytes)
            .build();

        Self {
            cache,
            max_size_bytes,
        }
    }

    pub async fn get(&self, url: &str) -> Option<Bytes> {
        self.cache.get(url).await
    }

    pub async fn insert(&self, url: &str, bytes: Bytes) {
        self.cache.insert(url.to_string(), bytes).await;
    }

    pub fn contains(&self, url: &str) -> bool {
        self.cache.contains_key(url)
    }

    /// Current weighted size in bytes. May lag behind recent writes.
    pub fn size_bytes(&self) -> u64 {
        self.cache.weighted_size()
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    /// Run pending eviction work so size and count reflect recent writes.
    pub async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE_BYTES)
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("entries", &self.cache.entry_count())
            .field("size_bytes", &self.cache.weighted_size())
            .field("max_size_bytes", &self.max_size_bytes)
            .finish()
    }
}
