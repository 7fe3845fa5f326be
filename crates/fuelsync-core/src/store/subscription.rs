// ── Snapshot subscriptions ──
//
// Consumers hold a subscription per collection and are woken whenever a
// fetch or offline mutation publishes a replacement snapshot.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::collection::{CollectionSnapshot, DataSource};
use crate::entity::EntityKind;

type Published<T> = Arc<CollectionSnapshot<T>>;

/// Live view of one store's published snapshots.
pub struct CollectionSubscription<T: EntityKind> {
    seen: Published<T>,
    rx: watch::Receiver<Published<T>>,
}

impl<T: EntityKind> CollectionSubscription<T> {
    pub(crate) fn new(rx: watch::Receiver<Published<T>>) -> Self {
        let seen = rx.borrow().clone();
        Self { seen, rx }
    }

    /// Snapshot as of subscribing or the last [`changed`](Self::changed).
    pub fn seen(&self) -> &Published<T> {
        &self.seen
    }

    /// Whatever the store holds right now, seen or not.
    pub fn latest(&self) -> Published<T> {
        self.rx.borrow().clone()
    }

    /// Wait for the next publication. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Published<T>> {
        self.rx.changed().await.ok()?;
        self.seen = self.rx.borrow_and_update().clone();
        Some(Arc::clone(&self.seen))
    }

    /// Wait until the collection has been loaded from either source.
    pub async fn loaded(&mut self) -> Option<Published<T>> {
        let snapshot = self
            .rx
            .wait_for(|s| s.source != DataSource::Unloaded)
            .await
            .ok()?
            .clone();
        self.seen = Arc::clone(&snapshot);
        Some(snapshot)
    }

    /// Publications after this point as a `Stream`.
    pub fn into_stream(self) -> SnapshotStream<T> {
        SnapshotStream {
            inner: WatchStream::from_changes(self.rx),
        }
    }
}

/// `Stream` of published snapshots, starting with the next one.
pub struct SnapshotStream<T: EntityKind> {
    inner: WatchStream<Published<T>>,
}

impl<T: EntityKind> Stream for SnapshotStream<T> {
    type Item = Published<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
