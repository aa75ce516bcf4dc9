//! Route sampling and the viewpoint model.
//!
//! [`sample`] reduces the flattened track to viewpoints spaced at a fixed
//! geodesic interval. Each [`Viewpoint`] starts `Pending`; only the resolver
//! moves it through its [`LoadState`] machine.

mod sampler;
mod viewpoint;

pub use sampler::{sample, RouteSampler, SamplingConfig, DEFAULT_INTERVAL_M};
pub use viewpoint::{LoadState, ResourceHandle, Viewpoint, ViewpointId};

use thiserror::Error;

/// Errors produced while sampling a route.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplingError {
    /// Fewer than two points were supplied.
    #[error("At least 2 track points are required, got {0}")]
    InsufficientPoints(usize),

    /// Sampling selected no points.
    #[error("Route sampling produced no viewpoints")]
    NoSamples,

    /// The interval is not a finite positive distance.
    #[error("Sampling interval must be a positive distance, got {0}")]
    InvalidInterval(f64),
}
