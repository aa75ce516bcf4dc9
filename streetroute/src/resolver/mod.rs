//! Viewpoint resolution with cursor-driven neighbor prefetch.
//!
//! The [`ViewpointResolver`] is the only writer of viewpoint load state. It
//! owns a [`ViewpointStore`] (the state machine, with query and subscribe
//! operations) and a [`CachedImageSource`] for fetching bytes.
//!
//! # Resolution
//!
//! ```text
//! resolve(id) ─► credential check ─► Loaded/Loading? ─yes─► current record
//!                                        │ no
//!                                        ▼
//!                                     Loading ─► fetch ─► Loaded | Failed
//! ```
//!
//! # Prefetch
//!
//! [`ViewpointResolver::navigate`] resolves the cursor immediately and
//! schedules `cursor - 1` and `cursor + 1` after a fixed delay. A neighbor is
//! skipped if it is `Loaded` or `Loading` once the delay elapses. In-flight
//! fetches are never cancelled; their writes are keyed by id and generation,
//! so a finished fetch for a replaced sequence is simply dropped.

mod credential;
mod error;
mod prefetch;
mod state;

pub use credential::validate_credential;
pub use error::ResolutionError;
pub use prefetch::{PrefetchHandle, PrefetchOutcome};
pub use state::{LoadCounts, StateChange, ViewpointStore};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::CachedImageSource;
use crate::provider::{ImageryProvider, ViewRenderOptions, ViewRequest};
use crate::route::{LoadState, ResourceHandle, Viewpoint, ViewpointId};
use state::Begin;

/// Default delay before neighbor prefetches start.
pub const DEFAULT_PREFETCH_DELAY: Duration = Duration::from_millis(300);

/// Upper bound between state checks while waiting for a viewpoint to settle.
pub const SETTLE_RECHECK_INTERVAL: Duration = Duration::from_millis(250);

/// Resolver tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Delay between a navigation and its neighbor prefetches.
    pub prefetch_delay: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            prefetch_delay: DEFAULT_PREFETCH_DELAY,
        }
    }
}

/// Outcome of one resolution attempt.
enum Attempt {
    /// No fetch was needed.
    Unchanged(Viewpoint),
    /// A fetch ran to completion.
    Finished(Viewpoint),
    /// The sequence changed before the attempt started.
    Superseded,
}

/// Resolves viewpoints to image resources.
///
/// Cloning is cheap; clones share the store and the image source.
pub struct ViewpointResolver<P> {
    source: CachedImageSource<P>,
    store: Arc<ViewpointStore>,
    config: ResolverConfig,
}

impl<P> Clone for ViewpointResolver<P> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<P: ImageryProvider + 'static> ViewpointResolver<P> {
    /// Create a resolver with an empty sequence.
    pub fn new(source: CachedImageSource<P>, config: ResolverConfig) -> Self {
        Self {
            source,
            store: Arc::new(ViewpointStore::new(Vec::new())),
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn source(&self) -> &CachedImageSource<P> {
        &self.source
    }

    /// The state machine, for queries and subscriptions.
    pub fn store(&self) -> &ViewpointStore {
        &self.store
    }

    /// Install a freshly sampled sequence, discarding all previous state.
    pub fn replace_viewpoints(&self, viewpoints: Vec<Viewpoint>) -> u64 {
        self.store.replace(viewpoints)
    }

    pub fn get(&self, id: ViewpointId) -> Option<Viewpoint> {
        self.store.get(id)
    }

    pub fn snapshot(&self) -> Vec<Viewpoint> {
        self.store.snapshot()
    }

    pub fn counts(&self) -> LoadCounts {
        self.store.counts()
    }

    pub fn subscribe(&self) -> Receiver<StateChange> {
        self.store.subscribe()
    }

    /// Resolve one viewpoint.
    ///
    /// A `Loaded` or `Loading` viewpoint is returned unchanged without a
    /// fetch. `Pending` and `Failed` viewpoints are fetched; a failed fetch
    /// is not an error here but a `Failed` record.
    ///
    /// # Errors
    ///
    /// - [`ResolutionError::MissingCredential`] / [`ResolutionError::InvalidCredentialFormat`],
    ///   checked before any state change
    /// - [`ResolutionError::UnknownViewpoint`] if `id` is out of range
    pub async fn resolve(
        &self,
        id: ViewpointId,
        options: &ViewRenderOptions,
    ) -> Result<Viewpoint, ResolutionError> {
        let credential = validate_credential(options.credential.as_deref())?;
        match self.attempt(None, id, options, credential).await? {
            Attempt::Unchanged(viewpoint) | Attempt::Finished(viewpoint) => Ok(viewpoint),
            Attempt::Superseded => Err(ResolutionError::UnknownViewpoint(id)),
        }
    }

    /// Move the navigation cursor.
    ///
    /// Schedules the neighbors of `cursor` for prefetch, then resolves the
    /// cursor viewpoint and returns it with a handle over the prefetches.
    pub async fn navigate(
        &self,
        cursor: usize,
        options: &ViewRenderOptions,
    ) -> Result<(Viewpoint, PrefetchHandle), ResolutionError> {
        let credential = validate_credential(options.credential.as_deref())?;
        let id = ViewpointId(cursor);
        let len = self.store.len();
        if cursor >= len {
            return Err(ResolutionError::UnknownViewpoint(id));
        }

        let generation = self.store.generation();
        let tasks = [cursor.checked_sub(1), Some(cursor + 1).filter(|&n| n < len)]
            .into_iter()
            .flatten()
            .map(|neighbor| {
                self.schedule_prefetch(
                    generation,
                    ViewpointId(neighbor),
                    options.clone(),
                    credential.to_string(),
                )
            })
            .collect();
        let prefetch = PrefetchHandle::new(tasks);

        let current = match self.attempt(Some(generation), id, options, credential).await? {
            Attempt::Unchanged(viewpoint) | Attempt::Finished(viewpoint) => viewpoint,
            Attempt::Superseded => return Err(ResolutionError::UnknownViewpoint(id)),
        };

        Ok((current, prefetch))
    }

    /// Wait until `id` is no longer `Loading` and return its record.
    ///
    /// Replacing the sequence sends no event, so the state is re-read at
    /// least every [`SETTLE_RECHECK_INTERVAL`].
    pub async fn wait_until_settled(&self, id: ViewpointId) -> Result<Viewpoint, ResolutionError> {
        let mut events = self.store.subscribe();
        loop {
            let viewpoint = self
                .store
                .get(id)
                .ok_or(ResolutionError::UnknownViewpoint(id))?;
            if viewpoint.load_state() != LoadState::Loading {
                return Ok(viewpoint);
            }

            match tokio::time::timeout(SETTLE_RECHECK_INTERVAL, events.recv()).await {
                Ok(Ok(_)) | Ok(Err(RecvError::Lagged(_))) | Err(_) => continue,
                Ok(Err(RecvError::Closed)) => return Ok(viewpoint),
            }
        }
    }

    fn schedule_prefetch(
        &self,
        generation: u64,
        id: ViewpointId,
        options: ViewRenderOptions,
        credential: String,
    ) -> JoinHandle<PrefetchOutcome> {
        let resolver = self.clone();
        let delay = self.config.prefetch_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            match resolver.attempt(Some(generation), id, &options, &credential).await {
                Ok(Attempt::Finished(viewpoint)) => PrefetchOutcome::Resolved {
                    id,
                    state: viewpoint.load_state(),
                },
                Ok(Attempt::Unchanged(viewpoint)) => PrefetchOutcome::Skipped {
                    id,
                    state: viewpoint.load_state(),
                },
                Ok(Attempt::Superseded) | Err(_) => PrefetchOutcome::Superseded { id },
            }
        })
    }

    async fn attempt(
        &self,
        expected_generation: Option<u64>,
        id: ViewpointId,
        options: &ViewRenderOptions,
        credential: &str,
    ) -> Result<Attempt, ResolutionError> {
        let (generation, started) = match self.store.begin(id, expected_generation)? {
            Begin::Started {
                generation,
                viewpoint,
            } => (generation, viewpoint),
            Begin::Current(viewpoint) => return Ok(Attempt::Unchanged(viewpoint)),
            Begin::Superseded => return Ok(Attempt::Superseded),
        };

        let request = ViewRequest {
            coordinates: started.coordinates(),
            heading: started.heading().unwrap_or(0.0),
            options,
            credential,
        };
        let url = self.source.locator(&request);
        debug!(id = %id, location = %request.coordinates, "Resolving viewpoint");

        // The fetch runs detached so a caller dropping this future cannot
        // leave the viewpoint stuck in `Loading`.
        let resolver = self.clone();
        let task =
            tokio::spawn(async move { resolver.fetch_and_complete(generation, started, url).await });

        match task.await {
            Ok(viewpoint) => Ok(Attempt::Finished(viewpoint)),
            Err(e) => {
                warn!(id = %id, error = %e, "Viewpoint fetch task did not finish");
                match self
                    .store
                    .complete(generation, id, Err(ResolutionError::FetchFailed))
                {
                    Some(record) => Ok(Attempt::Finished(record)),
                    None => Ok(Attempt::Superseded),
                }
            }
        }
    }

    /// Fetch the bytes behind `url` and record the terminal state.
    async fn fetch_and_complete(&self, generation: u64, started: Viewpoint, url: String) -> Viewpoint {
        let id = started.id();
        let outcome = match self.source.fetch(&url).await {
            Ok(bytes) => Ok(ResourceHandle {
                url,
                size_bytes: bytes.len(),
            }),
            Err(e) => {
                warn!(id = %id, location = %started.coordinates(), error = %e, "Viewpoint fetch failed");
                Err(ResolutionError::FetchFailed)
            }
        };

        let mut record = started;
        record.finish(outcome.clone());

        self.store.complete(generation, id, outcome).unwrap_or(record)
    }
}
