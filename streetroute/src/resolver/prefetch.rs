//! Neighbor prefetch task handles.

use futures::future::join_all;
use tokio::task::JoinHandle;

use crate::route::{LoadState, ViewpointId};

/// What a scheduled neighbor prefetch ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefetchOutcome {
    /// A fetch ran and left the viewpoint in `state`.
    Resolved { id: ViewpointId, state: LoadState },
    /// The viewpoint was already `Loaded` or `Loading` when the delay elapsed.
    Skipped { id: ViewpointId, state: LoadState },
    /// The sequence was replaced before the delay elapsed.
    Superseded { id: ViewpointId },
    /// The task panicked or was aborted by the runtime.
    Aborted,
}

/// Handle over the prefetch tasks scheduled by one navigation.
///
/// Prefetches run to completion whether or not this handle is kept; dropping
/// it only detaches the tasks.
#[derive(Debug, Default)]
pub struct PrefetchHandle {
    tasks: Vec<JoinHandle<PrefetchOutcome>>,
}

impl PrefetchHandle {
    pub(crate) fn new(tasks: Vec<JoinHandle<PrefetchOutcome>>) -> Self {
        Self { tasks }
    }

    /// Number of neighbors scheduled.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every scheduled prefetch, in scheduling order.
    pub async fn wait(self) -> Vec<PrefetchOutcome> {
        join_all(self.tasks)
            .await
            .into_iter()
            .map(|result| result.unwrap_or(PrefetchOutcome::Aborted))
            .collect()
    }
}
