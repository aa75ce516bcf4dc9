//! Export options.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default delay between individual file downloads.
pub const DEFAULT_DOWNLOAD_DELAY: Duration = Duration::from_millis(250);

/// Highest JPEG quality; images are passed through unchanged at this value.
pub const MAX_QUALITY: u8 = 100;

/// How exported images are handed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// A single zip archive.
    #[default]
    Archive,
    /// One file per image.
    Individual,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Archive => write!(f, "archive"),
            ExportFormat::Individual => write!(f, "individual"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "archive" | "zip" => Ok(ExportFormat::Archive),
            "individual" | "files" => Ok(ExportFormat::Individual),
            other => Err(format!(
                "unknown export format '{}', expected 'archive' or 'individual'",
                other
            )),
        }
    }
}

/// Per-request export options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Add `metadata.json` and `route_info.txt` to archives.
    pub include_metadata: bool,
    /// JPEG quality, 1..=100. Below 100 images are re-encoded.
    pub quality: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Archive,
            include_metadata: true,
            quality: MAX_QUALITY,
        }
    }
}

/// Exporter tuning that does not change per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterConfig {
    /// Pause between individual downloads.
    pub download_delay: Duration,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            download_delay: DEFAULT_DOWNLOAD_DELAY,
        }
    }
}
