//! Application handle construction.

use tracing::info;

use super::config::AppConfig;
use super::error::AppError;
use crate::cache::{CachedImageSource, ImageCache};
use crate::export::Exporter;
use crate::pipeline::PreparedRoute;
use crate::provider::{AsyncHttpClient, AsyncReqwestClient, ImageryProvider, StreetViewProvider};
use crate::resolver::ViewpointResolver;

/// Owns the HTTP client, provider, image cache, resolver and exporter for one
/// application run.
///
/// The resolver and exporter share one [`CachedImageSource`], so images
/// loaded while browsing are not downloaded again on export.
pub struct StreetRouteApp<C: AsyncHttpClient = AsyncReqwestClient> {
    resolver: ViewpointResolver<StreetViewProvider<C>>,
    exporter: Exporter<StreetViewProvider<C>>,
    config: AppConfig,
}

impl StreetRouteApp<AsyncReqwestClient> {
    /// Start with a reqwest-backed HTTP client.
    ///
    /// # Errors
    ///
    /// [`AppError::HttpClient`] if the client cannot be built.
    pub fn start(config: AppConfig) -> Result<Self, AppError> {
        let client = AsyncReqwestClient::with_timeout(config.http_timeout_secs)?;
        Ok(Self::with_client(config, client))
    }
}

impl<C: AsyncHttpClient + 'static> StreetRouteApp<C> {
    /// Start with an injected HTTP client.
    pub fn with_client(config: AppConfig, client: C) -> Self {
        Self::with_provider(config, StreetViewProvider::new(client))
    }

    /// Start with a fully built provider, e.g. one with a custom endpoint.
    pub fn with_provider(config: AppConfig, provider: StreetViewProvider<C>) -> Self {
        let cache = ImageCache::new(config.cache_size_bytes);
        let source = CachedImageSource::new(provider, cache);

        let resolver = ViewpointResolver::new(source.clone(), config.resolver.clone());
        let exporter = Exporter::new(source, config.exporter.clone());

        info!(
            provider = resolver.source().provider().name(),
            cache_bytes = config.cache_size_bytes,
            timeout_secs = config.http_timeout_secs,
            prefetch_delay_ms = config.resolver.prefetch_delay.as_millis() as u64,
            "StreetRoute started"
        );

        Self {
            resolver,
            exporter,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn resolver(&self) -> &ViewpointResolver<StreetViewProvider<C>> {
        &self.resolver
    }

    pub fn exporter(&self) -> &Exporter<StreetViewProvider<C>> {
        &self.exporter
    }

    pub fn cache(&self) -> &ImageCache {
        self.resolver.source().cache()
    }

    /// Hand a prepared route's viewpoints to the resolver, replacing any
    /// previous sequence. Returns the new sequence generation.
    pub fn install_route(&self, route: &PreparedRoute) -> u64 {
        self.resolver.replace_viewpoints(route.viewpoints().to_vec())
    }
}
