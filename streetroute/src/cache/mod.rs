//! Image byte caching.
//!
//! [`CachedImageSource`] is the single fetch path for image bytes: the
//! resolver fills the cache while loading viewpoints, and the exporter reads
//! the same entries back instead of downloading every image twice.

mod memory;

pub use memory::{ImageCache, DEFAULT_CACHE_SIZE_BYTES};

use std::sync::Arc;

use bytes::Bytes;
use tracing::trace;

use crate::provider::{redact_locator, ImageryProvider, ProviderError, ViewRequest};

/// An imagery provider fronted by an [`ImageCache`].
pub struct CachedImageSource<P> {
    provider: Arc<P>,
    cache: ImageCache,
}

impl<P> Clone for CachedImageSource<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            cache: self.cache.clone(),
        }
    }
}

impl<P: ImageryProvider> CachedImageSource<P> {
    pub fn new(provider: P, cache: ImageCache) -> Self {
        Self {
            provider: Arc::new(provider),
            cache,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Resource locator for a view.
    pub fn locator(&self, request: &ViewRequest<'_>) -> String {
        self.provider.locator(request)
    }

    /// Fetch the bytes behind `url`, from the cache if present.
    pub async fn fetch(&self, url: &str) -> Result<Bytes, ProviderError> {
        if let Some(bytes) = self.cache.get(url).await {
            trace!(url = %redact_locator(url), bytes = bytes.len(), "Image cache hit");
            return Ok(bytes);
        }

        let bytes = Bytes::from(self.provider.fetch(url).await?);
        self.cache.insert(url, bytes.clone()).await;
        trace!(
            url = %redact_locator(url),
            bytes = bytes.len(),
            provider = self.provider.name(),
            "Image fetched and cached"
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockAsyncHttpClient, StreetViewProvider};

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let client = MockAsyncHttpClient::ok(b"jpeg-bytes");
        let source = CachedImageSource::new(
            StreetViewProvider::new(client.clone()),
            ImageCache::new(1_000_000),
        );

        let first = source.fetch("http://example.test/1").await.unwrap();
        let second = source.fetch("http://example.test/1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let client = MockAsyncHttpClient::failing("HTTP 500");
        let source = CachedImageSource::new(
            StreetViewProvider::new(client.clone()),
            ImageCache::new(1_000_000),
        );

        assert!(source.fetch("http://example.test/1").await.is_err());
        assert!(source.fetch("http://example.test/1").await.is_err());
        assert_eq!(client.call_count(), 2);
        assert!(!source.cache().contains("http://example.test/1"));
    }

    #[tokio::test]
    async fn test_clones_share_cache() {
        let client = MockAsyncHttpClient::ok(b"jpeg-bytes");
        let source = CachedImageSource::new(
            StreetViewProvider::new(client.clone()),
            ImageCache::new(1_000_000),
        );
        let clone = source.clone();

        source.fetch("http://example.test/1").await.unwrap();
        clone.fetch("http://example.test/1").await.unwrap();
        assert_eq!(client.call_count(), 1);
    }
}
