//! Settings structs for each `[section]` of the INI config file.

use std::path::PathBuf;

use crate::cache::DEFAULT_CACHE_SIZE_BYTES;
use crate::export::{ExportFormat, DEFAULT_DOWNLOAD_DELAY, MAX_QUALITY};
use crate::provider::{ImageSize, DEFAULT_TIMEOUT_SECS};
use crate::resolver::DEFAULT_PREFETCH_DELAY;
use crate::route::DEFAULT_INTERVAL_M;

/// Default horizontal field of view in degrees.
pub const DEFAULT_FIELD_OF_VIEW: f64 = 90.0;

/// Default camera pitch in degrees.
pub const DEFAULT_PITCH: f64 = 0.0;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub imagery: ImagerySettings,
    pub sampling: SamplingSettings,
    pub resolver: ResolverSettings,
    pub export: ExportSettings,
    pub logging: LoggingSettings,
}

/// `[imagery]`: how street-level images are requested.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagerySettings {
    /// Provider API key. Validated when images are requested, not on load.
    pub api_key: Option<String>,
    pub image_size: ImageSize,
    pub field_of_view: f64,
    pub pitch: f64,
}

/// `[sampling]`
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingSettings {
    /// Target spacing between viewpoints in meters.
    pub interval: f64,
}

/// `[resolver]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Delay before neighbor prefetches start, in milliseconds.
    pub prefetch_delay_ms: u64,
    /// HTTP request timeout in seconds.
    pub timeout: u64,
    /// Image cache capacity in bytes.
    pub cache_size: usize,
}

/// `[export]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub format: ExportFormat,
    pub include_metadata: bool,
    /// JPEG quality, 1..=100.
    pub quality: u8,
    /// Pause between individual downloads, in milliseconds.
    pub download_delay_ms: u64,
    /// Destination directory (None = current directory).
    pub output_dir: Option<PathBuf>,
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log file path.
    pub file: PathBuf,
}

impl Default for ImagerySettings {
    fn default() -> Self {
        Self {
            api_key: None,
            image_size: ImageSize::default(),
            field_of_view: DEFAULT_FIELD_OF_VIEW,
            pitch: DEFAULT_PITCH,
        }
    }
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL_M,
        }
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            prefetch_delay_ms: DEFAULT_PREFETCH_DELAY.as_millis() as u64,
            timeout: DEFAULT_TIMEOUT_SECS,
            cache_size: DEFAULT_CACHE_SIZE_BYTES as usize,
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            include_metadata: true,
            quality: MAX_QUALITY,
            download_delay_ms: DEFAULT_DOWNLOAD_DELAY.as_millis() as u64,
            output_dir: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: super::file::config_directory().join("streetroute.log"),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            imagery: ImagerySettings::default(),
            sampling: SamplingSettings::default(),
            resolver: ResolverSettings::default(),
            export: ExportSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}
