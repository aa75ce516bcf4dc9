//! Application error types.

use std::fmt;

use crate::config::ConfigFileError;
use crate::provider::ProviderError;

/// Errors that can occur while starting the application.
#[derive(Debug)]
pub enum AppError {
    /// The HTTP client could not be built.
    HttpClient(ProviderError),

    /// The config file could not be loaded.
    ConfigFile(ConfigFileError),

    /// A configuration value is unusable.
    Config(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            AppError::ConfigFile(e) => write!(f, "{}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::HttpClient(e) => Some(e),
            AppError::ConfigFile(e) => Some(e),
            AppError::Config(_) => None,
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(e: ProviderError) -> Self {
        AppError::HttpClient(e)
    }
}

impl From<ConfigFileError> for AppError {
    fn from(e: ConfigFileError) -> Self {
        AppError::ConfigFile(e)
    }
}
