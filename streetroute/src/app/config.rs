//! Application configuration.
//!
//! [`AppConfig`] is the resolved, typed form of everything the application
//! handle needs. The CLI builds it from [`ConfigFile`] and then applies its
//! command-line overrides.

use std::time::Duration;

use super::error::AppError;
use crate::cache::DEFAULT_CACHE_SIZE_BYTES;
use crate::config::ConfigFile;
use crate::export::{ExportOptions, ExporterConfig};
use crate::provider::{ViewRenderOptions, DEFAULT_TIMEOUT_SECS};
use crate::resolver::ResolverConfig;
use crate::route::SamplingConfig;

/// Everything needed to start a [`StreetRouteApp`](super::StreetRouteApp).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Image request parameters, including the credential.
    pub render: ViewRenderOptions,
    pub sampling: SamplingConfig,
    pub resolver: ResolverConfig,
    pub exporter: ExporterConfig,
    /// Default per-request export options.
    pub export: ExportOptions,
    /// Image cache capacity.
    pub cache_size_bytes: u64,
    /// HTTP request timeout.
    pub http_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            render: ViewRenderOptions::default(),
            sampling: SamplingConfig::default(),
            resolver: ResolverConfig::default(),
            exporter: ExporterConfig::default(),
            export: ExportOptions::default(),
            cache_size_bytes: DEFAULT_CACHE_SIZE_BYTES,
            http_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Build from a loaded config file.
    ///
    /// # Errors
    ///
    /// [`AppError::Config`] if the sampling interval is not a positive,
    /// finite number. Files loaded through [`ConfigFile::load`] are already
    /// validated; this guards hand-built values.
    pub fn from_config_file(config: &ConfigFile) -> Result<Self, AppError> {
        let sampling = SamplingConfig::new(config.sampling.interval)
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self {
            render: ViewRenderOptions {
                image_size: config.imagery.image_size,
                field_of_view: config.imagery.field_of_view,
                pitch: config.imagery.pitch,
                credential: config.imagery.api_key.clone(),
            },
            sampling,
            resolver: ResolverConfig {
                prefetch_delay: Duration::from_millis(config.resolver.prefetch_delay_ms),
            },
            exporter: ExporterConfig {
                download_delay: Duration::from_millis(config.export.download_delay_ms),
            },
            export: ExportOptions {
                format: config.export.format,
                include_metadata: config.export.include_metadata,
                quality: config.export.quality,
            },
            cache_size_bytes: config.resolver.cache_size as u64,
            http_timeout_secs: config.resolver.timeout,
        })
    }

    /// Replace the credential.
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.render.credential = Some(credential.into());
        self
    }

    /// Replace the sampling interval.
    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }
}
