// ── Filter debouncing ──
//
// Rapid filter edits collapse into one forced fetch. There is a single
// pending timer at any time: scheduling cancels the previous one through
// its token and starts a fresh one carrying the newest filter set.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::entity::EntityKind;
use crate::model::FilterSet;
use crate::store::SyncedCollectionStore;

struct Pending {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

pub struct FilterDebouncer<T: EntityKind> {
    store: Arc<SyncedCollectionStore<T>>,
    window: Duration,
    pending: Mutex<Option<Pending>>,
}

impl<T: EntityKind> FilterDebouncer<T> {
    pub fn new(store: Arc<SyncedCollectionStore<T>>, window: Duration) -> Self {
        Self {
            store,
            window,
            pending: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Schedule a fetch of `filters` after the default quiet window.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, filters: FilterSet) {
        self.schedule_with(filters, self.window);
    }

    /// Schedule a fetch of `filters` after `window`, replacing any pending one.
    pub fn schedule_with(&self, filters: FilterSet, window: Duration) {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let store = Arc::clone(&self.store);

        let task = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {}
                () = tokio::time::sleep(window) => {
                    debug!(resource = T::RESOURCE, %filters, "quiet window elapsed, fetching");
                    store.fetch(&filters, true).await;
                }
            }
        });

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Pending { cancel, task });
        if let Some(previous) = previous {
            previous.cancel.cancel();
        }
    }

    /// Drop the pending timer, if any, without fetching.
    pub fn cancel(&self) {
        if let Some(pending) = self.pending.lock().unwrap_or_else(PoisonError::into_inner).take() {
            pending.cancel.cancel();
        }
    }

    /// Whether a timer is still waiting or its fetch is still running.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|p| !p.cancel.is_cancelled() && !p.task.is_finished())
    }
}

impl<T: EntityKind> Drop for FilterDebouncer<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}
