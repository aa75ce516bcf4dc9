//! StreetRoute - Street-level imagery along recorded GPS tracks
//!
//! This library turns a GPX track into an ordered sequence of viewpoints spaced
//! at a fixed geodesic interval, resolves each viewpoint to a street-level image
//! from the imagery provider, and bundles the resolved images for export.
//!
//! # Pipeline
//!
//! ```text
//! GPX text ─► track::parse_document ─► flat point sequence
//!          ─► route::sample          ─► Vec<Viewpoint>
//!          ─► resolver (cursor + neighbor prefetch)
//!          ─► export (zip archive or individual files)
//! ```
//!
//! # High-Level API
//!
//! ```ignore
//! use streetroute::app::{AppConfig, StreetRouteApp};
//! use streetroute::pipeline::Pipeline;
//!
//! let app = StreetRouteApp::start(AppConfig::default().with_credential(api_key))?;
//! let route = Pipeline::new().prepare(&gpx_text, app.config().sampling)?;
//! app.install_route(&route);
//! let (current, prefetch) = app.resolver().navigate(0, &app.config().render).await?;
//! ```

pub mod app;
pub mod cache;
pub mod config;
pub mod export;
pub mod geo;
pub mod logging;
pub mod pipeline;
pub mod provider;
pub mod resolver;
pub mod route;
pub mod track;

/// Version of the StreetRoute library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
