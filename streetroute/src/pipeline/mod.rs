//! Pipeline facade: parse → sample → load, with progress reporting.
//!
//! Parse and sampling errors abort a run before any viewpoint state exists.
//! Loading never fails on a single viewpoint; failed fetches are recorded on
//! the viewpoint and only show up in the returned [`LoadCounts`].

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

use crate::geo;
use crate::provider::{ImageryProvider, ViewRenderOptions};
use crate::resolver::{validate_credential, LoadCounts, ResolutionError, ViewpointResolver};
use crate::route::{LoadState, RouteSampler, SamplingConfig, SamplingError, Viewpoint, ViewpointId};
use crate::track::{parse_document, ParseError, RouteDocument};

/// Pipeline phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parsing,
    Generating,
    Loading,
    Complete,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Parsing => "parsing",
            Stage::Generating => "generating",
            Stage::Loading => "loading",
            Stage::Complete => "complete",
        };
        f.write_str(label)
    }
}

/// Progress signal emitted at each phase transition and per loaded viewpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub stage: Stage,
    pub current: usize,
    pub total: usize,
    pub message: String,
}

/// Progress callback invoked synchronously from the pipeline.
pub type ProgressCallback = Box<dyn Fn(&Progress) + Send + Sync>;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Sampling(#[from] SamplingError),
}

/// A parsed and sampled route.
#[derive(Debug, Clone)]
pub struct PreparedRoute {
    pub document: RouteDocument,
    sampler: RouteSampler,
}

impl PreparedRoute {
    /// Display name from the document, if it has one.
    pub fn name(&self) -> Option<&str> {
        self.document.display_name()
    }

    pub fn viewpoints(&self) -> &[Viewpoint] {
        self.sampler.viewpoints()
    }

    pub fn config(&self) -> SamplingConfig {
        self.sampler.config()
    }

    /// Along-path length of the flattened track in meters.
    pub fn track_length(&self) -> f64 {
        geo::path_length(self.sampler.points().iter().map(|p| p.coordinates()))
    }

    /// Cumulative distance of the last viewpoint in meters.
    pub fn sampled_length(&self) -> f64 {
        self.viewpoints()
            .last()
            .map(Viewpoint::cumulative_distance)
            .unwrap_or(0.0)
    }

    /// Regenerate all viewpoints with a new interval.
    pub fn resample(&mut self, config: SamplingConfig) -> Result<&[Viewpoint], SamplingError> {
        self.sampler.set_config(config)
    }

    pub fn into_viewpoints(self) -> Vec<Viewpoint> {
        self.sampler.into_viewpoints()
    }
}

/// Runs pipeline phases and reports progress.
#[derive(Default)]
pub struct Pipeline {
    progress: Option<ProgressCallback>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Parse a track document and sample it into viewpoints.
    pub fn prepare(&self, text: &str, config: SamplingConfig) -> Result<PreparedRoute, PipelineError> {
        self.emit(Stage::Parsing, 0, 1, "Parsing track document".to_string());
        let document = parse_document(text)?;

        let points = document.flatten();
        self.emit(
            Stage::Generating,
            0,
            points.len(),
            format!(
                "Sampling {} points every {}m",
                points.len(),
                config.interval_distance()
            ),
        );
        let sampler = RouteSampler::new(points, config)?;

        info!(
            tracks = document.tracks.len(),
            points = document.point_count(),
            viewpoints = sampler.viewpoints().len(),
            "Route prepared"
        );
        Ok(PreparedRoute { document, sampler })
    }

    /// Resolve every viewpoint of the resolver's current sequence in order,
    /// then wait for any fetch still in flight.
    ///
    /// # Errors
    ///
    /// Only credential errors, checked before anything is fetched.
    pub async fn load<P: ImageryProvider + 'static>(
        &self,
        resolver: &ViewpointResolver<P>,
        options: &ViewRenderOptions,
    ) -> Result<LoadCounts, ResolutionError> {
        validate_credential(options.credential.as_deref())?;

        let total = resolver.store().len();
        for index in 0..total {
            self.emit(
                Stage::Loading,
                index,
                total,
                format!("Loading viewpoint {} of {}", index + 1, total),
            );
            resolver.resolve(ViewpointId(index), options).await?;
        }

        // Fetches started elsewhere, e.g. neighbor prefetches, are still
        // `Loading`; their outcome belongs in the counts.
        for index in 0..total {
            let id = ViewpointId(index);
            if resolver.store().state(id) == Some(LoadState::Loading) {
                debug!(id = %id, "Waiting for in-flight fetch");
                resolver.wait_until_settled(id).await?;
            }
        }

        let counts = resolver.counts();
        self.emit(Stage::Complete, total, total, counts.to_string());
        info!(
            loaded = counts.loaded,
            failed = counts.failed,
            "Viewpoints loaded"
        );
        Ok(counts)
    }

    fn emit(&self, stage: Stage, current: usize, total: usize, message: String) {
        if let Some(callback) = &self.progress {
            callback(&Progress {
                stage,
                current,
                total,
                message,
            });
        }
    }
}
