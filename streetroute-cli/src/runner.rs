//! Shared command setup: config, logging, runtime and the application handle.

use std::future::Future;
use std::path::Path;

use tokio::runtime::Runtime;
use tracing::info;

use streetroute::app::{AppConfig, StreetRouteApp};
use streetroute::config::ConfigFile;
use streetroute::logging::{init_logging, LoggingGuard, LoggingOptions};

use crate::error::CliError;

/// Owns what every network-facing command needs for its lifetime.
pub struct CliRunner {
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
    runtime: Runtime,
}

impl CliRunner {
    /// Load config, start logging and build the runtime.
    ///
    /// With `verbose`, debug events are also mirrored to stderr.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let logging = LoggingOptions {
            file: config.logging.file.clone(),
            verbose,
            console: verbose,
        };
        let logging_guard =
            init_logging(&logging).map_err(|e| CliError::LoggingInit(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)?;

        Ok(Self {
            logging_guard,
            config,
            runtime,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn log_startup(&self, command: &str) {
        info!("StreetRoute v{}", streetroute::VERSION);
        info!("StreetRoute CLI: {} command", command);
    }

    /// Read a track file into memory.
    pub fn read_track(&self, path: &Path) -> Result<String, CliError> {
        std::fs::read_to_string(path).map_err(|error| CliError::ReadTrack {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Application config from the loaded file.
    pub fn app_config(&self) -> Result<AppConfig, CliError> {
        Ok(AppConfig::from_config_file(&self.config)?)
    }

    /// Start the application inside the runtime.
    pub fn start_app(&self, config: AppConfig) -> Result<StreetRouteApp, CliError> {
        let _guard = self.runtime.enter();
        Ok(StreetRouteApp::start(config)?)
    }

    /// Run a future to completion on the runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
