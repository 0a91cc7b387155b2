//! Single-flight token refresh.
//!
//! When several requests hit an expired access token at once, only the first
//! one starts a refresh. Everyone else joins it and receives the same
//! outcome. The pending operation clears itself from the slot when it
//! settles, so the next expiry starts a fresh refresh.

use crate::error::ApiError;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Outcome of one refresh: the new access token or the reason it failed.
pub type RefreshOutcome = Result<String, ApiError>;

type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

#[derive(Default)]
enum RefreshSlot {
    #[default]
    Idle,
    Pending {
        generation: u64,
        outcome: SharedRefresh,
    },
}

/// Shared handle to the in-flight refresh, if any.
#[derive(Clone, Default)]
pub struct RefreshCoordinator {
    slot: Arc<Mutex<RefreshSlot>>,
    started: Arc<AtomicU64>,
}

impl RefreshCoordinator {
    /// Create an idle coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Await the in-flight refresh, or start one with `start` if none is
    /// pending.
    ///
    /// `start` is only called when this caller becomes the leader.
    ///
    /// # Errors
    ///
    /// Returns the shared refresh error
    pub async fn obtain<F>(&self, start: F) -> RefreshOutcome
    where
        F: FnOnce() -> BoxFuture<'static, RefreshOutcome>,
    {
        let outcome = {
            let mut slot = self.slot.lock().await;
            match &*slot {
                RefreshSlot::Pending { outcome, .. } => {
                    tracing::debug!("Joining in-flight token refresh");
                    outcome.clone()
                }
                RefreshSlot::Idle => {
                    let generation = self.started.fetch_add(1, Ordering::SeqCst) + 1;
                    let outcome = self.settle_into_idle(generation, start());
                    *slot = RefreshSlot::Pending {
                        generation,
                        outcome: outcome.clone(),
                    };
                    outcome
                }
            }
        };

        outcome.await
    }

    /// Returns `true` while a refresh is pending.
    pub async fn is_pending(&self) -> bool {
        matches!(*self.slot.lock().await, RefreshSlot::Pending { .. })
    }

    /// Number of refresh operations started so far.
    #[must_use]
    pub fn started(&self) -> u64 {
        self.started.load(Ordering::SeqCst)
    }

    // Wraps the operation so that whoever drives it to completion also
    // returns the slot to idle. A leader dropped mid-flight leaves the
    // operation for the next caller to finish.
    fn settle_into_idle(
        &self,
        generation: u64,
        operation: BoxFuture<'static, RefreshOutcome>,
    ) -> SharedRefresh {
        let slot = Arc::clone(&self.slot);
        async move {
            let outcome = operation.await;
            let mut slot = slot.lock().await;
            if matches!(&*slot, RefreshSlot::Pending { generation: g, .. } if *g == generation) {
                *slot = RefreshSlot::Idle;
            }
            outcome
        }
        .boxed()
        .shared()
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("started", &self.started())
            .finish_non_exhaustive()
    }
}
