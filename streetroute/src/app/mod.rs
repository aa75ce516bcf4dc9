//! Application-scoped wiring.
//!
//! [`StreetRouteApp`] is built once per run and owns every long-lived
//! collaborator: the HTTP client, the imagery provider, the image cache, the
//! viewpoint resolver and the exporter. Nothing in the library is a global.
//!
//! ```text
//! AppConfig ─► StreetRouteApp
//!                ├── CachedImageSource (provider + ImageCache)
//!                ├── ViewpointResolver ─┐
//!                └── Exporter ──────────┴── share the source
//! ```
//!
//! # Example
//!
//! ```ignore
//! use streetroute::app::{AppConfig, StreetRouteApp};
//! use streetroute::config::ConfigFile;
//!
//! let config = AppConfig::from_config_file(&ConfigFile::load()?)?;
//! let app = StreetRouteApp::start(config)?;
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::StreetRouteApp;
pub use config::AppConfig;
pub use error::AppError;
