//! Provider types and traits

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use crate::geo::Coordinates;

/// Errors that can occur during provider operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// HTTP request failed
    HttpError(String),
    /// Provider answered with data that is not an image
    InvalidResponse(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Requested image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self::new(640, 640)
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for ImageSize {
    type Err = String;

    /// Parse `WxH`, e.g. `640x480`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;

        let parse = |v: &str| -> Result<u32, String> {
            match v.trim().parse::<u32>() {
                Ok(0) | Err(_) => Err(format!("invalid dimension '{}'", v.trim())),
                Ok(n) => Ok(n),
            }
        };

        Ok(Self::new(parse(w)?, parse(h)?))
    }
}

/// Rendering parameters shared by every viewpoint request.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRenderOptions {
    pub image_size: ImageSize,
    /// Horizontal field of view in degrees.
    pub field_of_view: f64,
    /// Camera pitch in degrees, positive up.
    pub pitch: f64,
    /// Provider access key.
    pub credential: Option<String>,
}

impl Default for ViewRenderOptions {
    fn default() -> Self {
        Self {
            image_size: ImageSize::default(),
            field_of_view: 90.0,
            pitch: 0.0,
            credential: None,
        }
    }
}

/// Everything needed to build one resource locator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRequest<'a> {
    pub coordinates: Coordinates,
    /// Compass heading in degrees.
    pub heading: f64,
    pub options: &'a ViewRenderOptions,
    /// Validated credential to embed in the locator.
    pub credential: &'a str,
}

/// Trait for street-level imagery providers.
///
/// Implementors map a view request to a resource locator and fetch the
/// image bytes behind it.
pub trait ImageryProvider: Send + Sync {
    /// Builds the resource locator for a view. Must be deterministic.
    fn locator(&self, request: &ViewRequest<'_>) -> String;

    /// Fetches the image behind a locator.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;

    /// Returns the provider's name for logging and identification.
    fn name(&self) -> &str;
}
