//! CLI error handling with user-friendly messages.
//!
//! Every command returns `Result<(), CliError>`; `main` prints the error and
//! exits with status 1.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process;

use streetroute::app::AppError;
use streetroute::config::ConfigFileError;
use streetroute::export::ExportError;
use streetroute::pipeline::PipelineError;
use streetroute::provider::ProviderError;
use streetroute::resolver::ResolutionError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Invalid setting or argument
    Config(String),
    /// Config file could not be read or written
    ConfigFile(ConfigFileError),
    /// Application could not start
    App(AppError),
    /// Failed to create the async runtime
    Runtime(io::Error),
    /// Track file could not be read
    ReadTrack { path: PathBuf, error: io::Error },
    /// Track could not be parsed or sampled
    Pipeline(PipelineError),
    /// Viewpoint could not be resolved
    Resolution(ResolutionError),
    /// Image bytes could not be fetched
    ImageFetch(ProviderError),
    /// Export failed
    Export(ExportError),
    /// Output file could not be written
    FileWrite { path: PathBuf, error: io::Error },
}

impl CliError {
    /// Print the error with any follow-up hints and exit with status 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Resolution(
                ResolutionError::MissingCredential | ResolutionError::InvalidCredentialFormat,
            ) => {
                eprintln!();
                eprintln!("Street-level imagery needs an API key. Either:");
                eprintln!("  1. Save it: streetroute config set imagery.api_key <KEY>");
                eprintln!("  2. Pass it per run: --api-key <KEY>");
                eprintln!("Keys start with 'AIza' and are 39 characters long.");
            }
            CliError::Export(ExportError::NothingToExport) => {
                eprintln!();
                eprintln!("No image could be loaded for this route. Check that the API key");
                eprintln!("has the Street View Static API enabled, and look for fetch");
                eprintln!("errors in the log: streetroute config get logging.file");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::App(e) => write!(f, "{}", e),
            CliError::Runtime(e) => write!(f, "Failed to create async runtime: {}", e),
            CliError::ReadTrack { path, error } => {
                write!(f, "Failed to read track '{}': {}", path.display(), error)
            }
            CliError::Pipeline(e) => write!(f, "Invalid track: {}", e),
            CliError::Resolution(e) => write!(f, "{}", e),
            CliError::ImageFetch(e) => write!(f, "Failed to fetch image: {}", e),
            CliError::Export(e) => write!(f, "Export failed: {}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::App(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::ReadTrack { error, .. } => Some(error),
            CliError::Pipeline(e) => Some(e),
            CliError::Resolution(e) => Some(e),
            CliError::ImageFetch(e) => Some(e),
            CliError::Export(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            CliError::LoggingInit(_) | CliError::Config(_) => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        CliError::Pipeline(e)
    }
}

impl From<ResolutionError> for CliError {
    fn from(e: ResolutionError) -> Self {
        CliError::Resolution(e)
    }
}

impl From<ExportError> for CliError {
    fn from(e: ExportError) -> Self {
        CliError::Export(e)
    }
}
