//! Viewpoint records and their load-state machine.

use std::fmt;

use crate::geo::Coordinates;
use crate::resolver::ResolutionError;

/// Position of a viewpoint within its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewpointId(pub usize);

impl fmt::Display for ViewpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Load state of a single viewpoint.
///
/// Transitions only move forward (`Pending → Loading → Loaded | Failed`)
/// except `Failed → Loading`, which is a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadState {
    #[default]
    Pending,
    Loading,
    Loaded,
    Failed,
}

impl LoadState {
    /// `Loaded` or `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, LoadState::Loaded | LoadState::Failed)
    }

    /// Whether a resolve request for this state should start a fetch.
    pub fn needs_fetch(self) -> bool {
        matches!(self, LoadState::Pending | LoadState::Failed)
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoadState::Pending => "pending",
            LoadState::Loading => "loading",
            LoadState::Loaded => "loaded",
            LoadState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Handle to a fetched image.
///
/// The bytes live in the image cache under `url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    /// Resource locator the image was fetched from.
    pub url: String,
    /// Size of the fetched image in bytes.
    pub size_bytes: usize,
}

/// A sampled location plus orientation, resolved to at most one image.
///
/// Fields are read-only outside the crate; state transitions are performed
/// by the resolver's store.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewpoint {
    id: ViewpointId,
    coordinates: Coordinates,
    heading: Option<f64>,
    cumulative_distance: f64,
    load_state: LoadState,
    resource: Option<ResourceHandle>,
    error: Option<ResolutionError>,
}

impl Viewpoint {
    pub(crate) fn new(
        id: ViewpointId,
        coordinates: Coordinates,
        heading: Option<f64>,
        cumulative_distance: f64,
    ) -> Self {
        Self {
            id,
            coordinates,
            heading,
            cumulative_distance,
            load_state: LoadState::Pending,
            resource: None,
            error: None,
        }
    }

    pub fn id(&self) -> ViewpointId {
        self.id
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    /// Bearing toward the next viewpoint. `None` for the last one.
    pub fn heading(&self) -> Option<f64> {
        self.heading
    }

    /// Sum of distances between consecutive sampled viewpoints up to this one.
    pub fn cumulative_distance(&self) -> f64 {
        self.cumulative_distance
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// Present iff the viewpoint is `Loaded`.
    pub fn resource(&self) -> Option<&ResourceHandle> {
        self.resource.as_ref()
    }

    /// Present iff the viewpoint is `Failed`.
    pub fn error(&self) -> Option<&ResolutionError> {
        self.error.as_ref()
    }

    /// Loaded, error-free and carrying a resource.
    pub fn is_exportable(&self) -> bool {
        self.load_state == LoadState::Loaded && self.error.is_none() && self.resource.is_some()
    }

    /// Move into `Loading`. Returns false if the current state forbids it.
    pub(crate) fn begin_loading(&mut self) -> bool {
        if !self.load_state.needs_fetch() {
            return false;
        }
        self.load_state = LoadState::Loading;
        self.resource = None;
        self.error = None;
        true
    }

    /// Record the outcome of a fetch started by [`begin_loading`].
    ///
    /// Only applies while `Loading`; a terminal state is never overwritten.
    ///
    /// [`begin_loading`]: Viewpoint::begin_loading
    pub(crate) fn finish(&mut self, outcome: Result<ResourceHandle, ResolutionError>) -> bool {
        if self.load_state != LoadState::Loading {
            return false;
        }
        match outcome {
            Ok(resource) => {
                self.load_state = LoadState::Loaded;
                self.resource = Some(resource);
                self.error = None;
            }
            Err(error) => {
                self.load_state = LoadState::Failed;
                self.resource = None;
                self.error = Some(error);
            }
        }
        true
    }
}
