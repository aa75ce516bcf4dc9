//! The viewpoint store: load-state machine owner with query and subscribe.
//!
//! All transitions go through [`ViewpointStore::begin`] and
//! [`ViewpointStore::complete`]. Each holds the lock for the check and the
//! write together and never across an await, so concurrent requests for one
//! viewpoint observe a single `Loading → terminal` sequence.
//!
//! Every sequence installed with [`ViewpointStore::replace`] gets a new
//! generation number. Completions carry the generation they started in and
//! are dropped if the sequence has since been replaced.

use std::fmt;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, trace};

use super::ResolutionError;
use crate::route::{LoadState, ResourceHandle, Viewpoint, ViewpointId};

/// Capacity of the state change channel. Slow subscribers observe `Lagged`.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// One observed load-state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    /// Sequence generation the viewpoint belongs to.
    pub generation: u64,
    pub id: ViewpointId,
    pub state: LoadState,
}

/// Aggregate load states across the current sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadCounts {
    pub pending: usize,
    pub loading: usize,
    pub loaded: usize,
    pub failed: usize,
}

impl LoadCounts {
    pub fn total(&self) -> usize {
        self.pending + self.loading + self.loaded + self.failed
    }

    fn record(&mut self, state: LoadState) {
        match state {
            LoadState::Pending => self.pending += 1,
            LoadState::Loading => self.loading += 1,
            LoadState::Loaded => self.loaded += 1,
            LoadState::Failed => self.failed += 1,
        }
    }
}

impl fmt::Display for LoadCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} loaded, {} failed, {} loading, {} pending",
            self.loaded, self.failed, self.loading, self.pending
        )
    }
}

/// Result of asking the store to start loading a viewpoint.
#[derive(Debug)]
pub(crate) enum Begin {
    /// The viewpoint moved to `Loading`; the caller must fetch and complete.
    Started { generation: u64, viewpoint: Viewpoint },
    /// Already `Loading` or `Loaded`; the current record, unchanged.
    Current(Viewpoint),
    /// The sequence was replaced since the caller looked at it.
    Superseded,
}

struct Inner {
    generation: u64,
    viewpoints: Vec<Viewpoint>,
}

/// Shared owner of the current viewpoint sequence.
pub struct ViewpointStore {
    inner: Mutex<Inner>,
    events: broadcast::Sender<StateChange>,
}

impl ViewpointStore {
    pub fn new(viewpoints: Vec<Viewpoint>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Mutex::new(Inner {
                generation: 0,
                viewpoints,
            }),
            events,
        }
    }

    /// Install a new sequence, discarding all previous state.
    ///
    /// Returns the new generation.
    pub(crate) fn replace(&self, viewpoints: Vec<Viewpoint>) -> u64 {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.viewpoints = viewpoints;
        debug!(
            generation = inner.generation,
            viewpoints = inner.viewpoints.len(),
            "Viewpoint sequence replaced"
        );
        inner.generation
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    pub fn len(&self) -> usize {
        self.inner.lock().viewpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: ViewpointId) -> Option<Viewpoint> {
        self.inner.lock().viewpoints.get(id.0).cloned()
    }

    pub fn state(&self, id: ViewpointId) -> Option<LoadState> {
        self.inner
            .lock()
            .viewpoints
            .get(id.0)
            .map(Viewpoint::load_state)
    }

    /// Copy of the whole current sequence.
    pub fn snapshot(&self) -> Vec<Viewpoint> {
        self.inner.lock().viewpoints.clone()
    }

    pub fn counts(&self) -> LoadCounts {
        let inner = self.inner.lock();
        let mut counts = LoadCounts::default();
        for viewpoint in &inner.viewpoints {
            counts.record(viewpoint.load_state());
        }
        counts
    }

    /// Receive every subsequent state transition.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.events.subscribe()
    }

    /// Atomically check the state of `id` and move it to `Loading` if it
    /// needs a fetch.
    ///
    /// With `expected_generation` set, nothing happens if the sequence has
    /// been replaced since.
    pub(crate) fn begin(
        &self,
        id: ViewpointId,
        expected_generation: Option<u64>,
    ) -> Result<Begin, ResolutionError> {
        let mut inner = self.inner.lock();
        let generation = inner.generation;

        if expected_generation.is_some_and(|expected| expected != generation) {
            return Ok(Begin::Superseded);
        }

        let viewpoint = inner
            .viewpoints
            .get_mut(id.0)
            .ok_or(ResolutionError::UnknownViewpoint(id))?;

        if !viewpoint.begin_loading() {
            trace!(id = %id, state = %viewpoint.load_state(), "Viewpoint already in progress");
            return Ok(Begin::Current(viewpoint.clone()));
        }

        self.notify(generation, id, LoadState::Loading);
        Ok(Begin::Started {
            generation,
            viewpoint: viewpoint.clone(),
        })
    }

    /// Record the outcome of a fetch started in `generation`.
    ///
    /// Returns the updated record, or `None` if the write was dropped because
    /// the sequence was replaced.
    pub(crate) fn complete(
        &self,
        generation: u64,
        id: ViewpointId,
        outcome: Result<ResourceHandle, ResolutionError>,
    ) -> Option<Viewpoint> {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            debug!(id = %id, generation, "Dropping result for replaced sequence");
            return None;
        }

        let viewpoint = inner.viewpoints.get_mut(id.0)?;
        if viewpoint.finish(outcome) {
            self.notify(generation, id, viewpoint.load_state());
        }
        Some(viewpoint.clone())
    }

    fn notify(&self, generation: u64, id: ViewpointId, state: LoadState) {
        // No receivers is not an error
        let _ = self.events.send(StateChange {
            generation,
            id,
            state,
        });
    }
}

impl fmt::Debug for ViewpointStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ViewpointStore")
            .field("generation", &inner.generation)
            .field("viewpoints", &inner.viewpoints.len())
            .finish()
    }
}
