//! Typed access to individual settings by their `section.key` name.
//!
//! [`ConfigKey`] is the single place where INI key names meet struct fields:
//! the file parser, `config get/set/list` and the writer all go through it.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use super::settings::ConfigFile;
use super::size::{format_size, parse_size};
use crate::export::{ExportFormat, MAX_QUALITY};
use crate::provider::ImageSize;

/// Errors from getting or setting a value by key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigKeyError {
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Every setting that can be read or written by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ImageryApiKey,
    ImageryImageSize,
    ImageryFieldOfView,
    ImageryPitch,

    SamplingInterval,

    ResolverPrefetchDelayMs,
    ResolverTimeout,
    ResolverCacheSize,

    ExportFormat,
    ExportIncludeMetadata,
    ExportQuality,
    ExportDownloadDelayMs,
    ExportOutputDir,

    LoggingFile,
}

static ALL_KEYS: [ConfigKey; 14] = [
    ConfigKey::ImageryApiKey,
    ConfigKey::ImageryImageSize,
    ConfigKey::ImageryFieldOfView,
    ConfigKey::ImageryPitch,
    ConfigKey::SamplingInterval,
    ConfigKey::ResolverPrefetchDelayMs,
    ConfigKey::ResolverTimeout,
    ConfigKey::ResolverCacheSize,
    ConfigKey::ExportFormat,
    ConfigKey::ExportIncludeMetadata,
    ConfigKey::ExportQuality,
    ConfigKey::ExportDownloadDelayMs,
    ConfigKey::ExportOutputDir,
    ConfigKey::LoggingFile,
];

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// All keys in file order.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// Canonical `section.key` name.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::ImageryApiKey => "imagery.api_key",
            ConfigKey::ImageryImageSize => "imagery.image_size",
            ConfigKey::ImageryFieldOfView => "imagery.field_of_view",
            ConfigKey::ImageryPitch => "imagery.pitch",
            ConfigKey::SamplingInterval => "sampling.interval",
            ConfigKey::ResolverPrefetchDelayMs => "resolver.prefetch_delay_ms",
            ConfigKey::ResolverTimeout => "resolver.timeout",
            ConfigKey::ResolverCacheSize => "resolver.cache_size",
            ConfigKey::ExportFormat => "export.format",
            ConfigKey::ExportIncludeMetadata => "export.include_metadata",
            ConfigKey::ExportQuality => "export.quality",
            ConfigKey::ExportDownloadDelayMs => "export.download_delay_ms",
            ConfigKey::ExportOutputDir => "export.output_dir",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    pub fn section(&self) -> &'static str {
        self.split().0
    }

    pub fn key_name(&self) -> &'static str {
        self.split().1
    }

    fn split(&self) -> (&'static str, &'static str) {
        self.name().split_once('.').unwrap_or(("", self.name()))
    }

    /// True for values that should not be echoed in full.
    pub fn is_secret(&self) -> bool {
        matches!(self, ConfigKey::ImageryApiKey)
    }

    /// Current value rendered the way it is written to the file.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ImageryApiKey => config.imagery.api_key.clone().unwrap_or_default(),
            ConfigKey::ImageryImageSize => config.imagery.image_size.to_string(),
            ConfigKey::ImageryFieldOfView => config.imagery.field_of_view.to_string(),
            ConfigKey::ImageryPitch => config.imagery.pitch.to_string(),
            ConfigKey::SamplingInterval => config.sampling.interval.to_string(),
            ConfigKey::ResolverPrefetchDelayMs => config.resolver.prefetch_delay_ms.to_string(),
            ConfigKey::ResolverTimeout => config.resolver.timeout.to_string(),
            ConfigKey::ResolverCacheSize => format_size(config.resolver.cache_size),
            ConfigKey::ExportFormat => config.export.format.to_string(),
            ConfigKey::ExportIncludeMetadata => config.export.include_metadata.to_string(),
            ConfigKey::ExportQuality => config.export.quality.to_string(),
            ConfigKey::ExportDownloadDelayMs => config.export.download_delay_ms.to_string(),
            ConfigKey::ExportOutputDir => config
                .export
                .output_dir
                .as_deref()
                .map(path_to_display)
                .unwrap_or_default(),
            ConfigKey::LoggingFile => path_to_display(&config.logging.file),
        }
    }

    /// Validate `value` and store it.
    ///
    /// The config is left untouched when validation fails.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        let value = value.trim();
        let fail = |reason: String| ConfigKeyError::ValidationFailed {
            key: self.name().to_string(),
            reason,
        };

        match self {
            ConfigKey::ImageryApiKey => config.imagery.api_key = optional_string(value),
            ConfigKey::ImageryImageSize => {
                config.imagery.image_size = value.parse::<ImageSize>().map_err(fail)?;
            }
            ConfigKey::ImageryFieldOfView => {
                config.imagery.field_of_view = parse_ranged(value, 1.0, 120.0).map_err(fail)?;
            }
            ConfigKey::ImageryPitch => {
                config.imagery.pitch = parse_ranged(value, -90.0, 90.0).map_err(fail)?;
            }
            ConfigKey::SamplingInterval => {
                config.sampling.interval = parse_positive_number(value).map_err(fail)?;
            }
            ConfigKey::ResolverPrefetchDelayMs => {
                config.resolver.prefetch_delay_ms = parse_integer(value).map_err(fail)?;
            }
            ConfigKey::ResolverTimeout => {
                config.resolver.timeout = parse_positive_integer(value).map_err(fail)?;
            }
            ConfigKey::ResolverCacheSize => {
                config.resolver.cache_size = parse_size(value).map_err(|e| fail(e.to_string()))?;
            }
            ConfigKey::ExportFormat => {
                config.export.format = value.parse::<ExportFormat>().map_err(fail)?;
            }
            ConfigKey::ExportIncludeMetadata => {
                config.export.include_metadata = parse_bool(value).map_err(fail)?;
            }
            ConfigKey::ExportQuality => {
                config.export.quality = parse_quality(value).map_err(fail)?;
            }
            ConfigKey::ExportDownloadDelayMs => {
                config.export.download_delay_ms = parse_integer(value).map_err(fail)?;
            }
            ConfigKey::ExportOutputDir => config.export.output_dir = optional_path(value),
            ConfigKey::LoggingFile => {
                if value.is_empty() {
                    return Err(fail("must not be empty".to_string()));
                }
                config.logging.file = expand_tilde(value);
            }
        }
        Ok(())
    }
}

fn parse_integer(value: &str) -> Result<u64, String> {
    value
        .parse()
        .map_err(|_| "must be a non-negative integer".to_string())
}

fn parse_positive_integer(value: &str) -> Result<u64, String> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err("must be a positive integer".to_string()),
    }
}

fn parse_positive_number(value: &str) -> Result<f64, String> {
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => Ok(n),
        _ => Err("must be a positive number".to_string()),
    }
}

fn parse_ranged(value: &str, min: f64, max: f64) -> Result<f64, String> {
    match value.parse::<f64>() {
        Ok(n) if (min..=max).contains(&n) => Ok(n),
        _ => Err(format!("must be a number between {} and {}", min, max)),
    }
}

fn parse_quality(value: &str) -> Result<u8, String> {
    match value.parse::<u8>() {
        Ok(q) if (1..=MAX_QUALITY).contains(&q) => Ok(q),
        _ => Err(format!("must be an integer between 1 and {}", MAX_QUALITY)),
    }
}

pub(super) fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err("must be true or false".to_string()),
    }
}

fn optional_string(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn optional_path(value: &str) -> Option<PathBuf> {
    (!value.is_empty()).then(|| expand_tilde(value))
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Render a path, collapsing the home directory back to `~`.
pub(super) fn path_to_display(path: &Path) -> String {
    dirs::home_dir()
        .and_then(|home| path.strip_prefix(home).ok().map(|rest| format!("~/{}", rest.display())))
        .unwrap_or_else(|| path.display().to_string())
}
