// ── Synchronized collection store ──
//
// Owns the canonical collection for one entity type. Every fetch asks the
// connection provider first, then reads either the backend list endpoint
// or the fallback repository, and publishes the result as one snapshot.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use fuelsync_api::{ApiClient, ConnectionStatus};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::collection::{CollectionSnapshot, DataSource};
use super::subscription::CollectionSubscription;
use crate::connection::ConnectionStatusProvider;
use crate::entity::EntityKind;
use crate::error::ApiError;
use crate::fallback::FallbackRepository;
use crate::model::FilterSet;
use crate::notify::{Notification, NotificationSink};

/// Result of one [`fetch`](SyncedCollectionStore::fetch).
#[derive(Debug, Clone)]
pub struct FetchOutcome<T: EntityKind> {
    /// Snapshot in effect after the fetch.
    pub snapshot: Arc<CollectionSnapshot<T>>,
    /// The remote failure that caused a fallback, if any.
    pub error: Option<ApiError>,
    /// `true` when the filter signature was unchanged and no I/O happened.
    pub skipped: bool,
}

impl<T: EntityKind> FetchOutcome<T> {
    pub fn source(&self) -> DataSource {
        self.snapshot.source
    }
}

/// Canonical collection and statistics for one entity type.
pub struct SyncedCollectionStore<T: EntityKind> {
    client: Arc<ApiClient>,
    status: Arc<dyn ConnectionStatusProvider>,
    fallback: Arc<dyn FallbackRepository<T>>,
    notifier: Arc<dyn NotificationSink>,
    snapshot: watch::Sender<Arc<CollectionSnapshot<T>>>,
    filters: watch::Sender<FilterSet>,
    last_signature: Mutex<Option<String>>,
    last_error: watch::Sender<Option<ApiError>>,
    last_sync: Mutex<Option<DateTime<Utc>>>,
}

impl<T: EntityKind> SyncedCollectionStore<T> {
    pub fn new(
        client: Arc<ApiClient>,
        status: Arc<dyn ConnectionStatusProvider>,
        fallback: Arc<dyn FallbackRepository<T>>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(CollectionSnapshot::unloaded()));
        let (filters, _) = watch::channel(T::default_filters());
        let (last_error, _) = watch::channel(None);

        Self {
            client,
            status,
            fallback,
            notifier,
            snapshot,
            filters,
            last_signature: Mutex::new(None),
            last_error,
            last_sync: Mutex::new(None),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<CollectionSnapshot<T>> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> CollectionSubscription<T> {
        CollectionSubscription::new(self.snapshot.subscribe())
    }

    /// Filters used by [`refresh`](Self::refresh).
    pub fn filters(&self) -> FilterSet {
        self.filters.borrow().clone()
    }

    pub fn watch_filters(&self) -> watch::Receiver<FilterSet> {
        self.filters.subscribe()
    }

    /// Replace the current filters wholesale. Keys the entity type does not
    /// recognize are dropped and missing keys read as `ALL`.
    pub fn set_filters(&self, filters: &FilterSet) {
        let normalized = normalize::<T>(filters);
        self.filters.send_replace(normalized);
    }

    /// The most recent error surfaced by a fetch or mutation.
    pub fn last_error(&self) -> Option<ApiError> {
        self.last_error.borrow().clone()
    }

    pub fn watch_errors(&self) -> watch::Receiver<Option<ApiError>> {
        self.last_error.subscribe()
    }

    /// When the backend last answered a list call successfully.
    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        *self.last_sync.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Last probe result, stamped with the last successful sync.
    pub fn connection_status(&self) -> Option<ConnectionStatus> {
        self.status
            .last_known()
            .map(|s| s.with_last_sync(self.last_sync()))
    }

    pub(crate) fn client(&self) -> &ApiClient {
        &self.client
    }

    pub(crate) fn status_provider(&self) -> &dyn ConnectionStatusProvider {
        self.status.as_ref()
    }

    pub(crate) fn fallback(&self) -> &dyn FallbackRepository<T> {
        self.fallback.as_ref()
    }

    pub(crate) fn notifier(&self) -> &dyn NotificationSink {
        self.notifier.as_ref()
    }

    // ── Fetch ────────────────────────────────────────────────────────

    /// Re-read the collection with the current filters.
    pub async fn refresh(&self) -> FetchOutcome<T> {
        let filters = self.filters();
        self.fetch(&filters, true).await
    }

    /// Load the collection for `filters`, which become the current filters.
    ///
    /// Without `force`, an unchanged filter signature returns the current
    /// snapshot without I/O. A failed remote read is reported to the
    /// notification sink and answered from the fallback repository; the
    /// error is returned in the outcome. Overlapping fetches are not
    /// ordered: the last one to complete wins.
    pub async fn fetch(&self, filters: &FilterSet, force: bool) -> FetchOutcome<T> {
        let filters = normalize::<T>(filters);
        let signature = filters.signature();
        self.filters.send_if_modified(|current| {
            if current.signature() == signature {
                return false;
            }
            *current = filters.clone();
            true
        });

        if !force && self.signature_matches(&signature) {
            debug!(resource = T::RESOURCE, %filters, "filters unchanged, skipping fetch");
            return FetchOutcome {
                snapshot: self.snapshot(),
                error: None,
                skipped: true,
            };
        }

        let status = self.status.status().await;
        let mut error = None;

        if status.connected {
            match self.fetch_remote(&filters).await {
                Ok(snapshot) => {
                    self.touch_sync(snapshot.fetched_at);
                    let snapshot = self.publish(snapshot, signature);
                    return FetchOutcome {
                        snapshot,
                        error: None,
                        skipped: false,
                    };
                }
                Err(e) => {
                    warn!(resource = T::RESOURCE, error = %e, "remote fetch failed, serving fallback data");
                    self.surface(Notification::failure(format!("Could not load {}", T::RESOURCE), e.clone()));
                    error = Some(e);
                }
            }
        } else {
            debug!(resource = T::RESOURCE, endpoint = %status.endpoint, "backend unreachable, serving fallback data");
        }

        let items = self.fallback.list(&filters);
        let snapshot = self.publish(
            CollectionSnapshot::derived(items, DataSource::Fallback, filters),
            signature,
        );
        FetchOutcome {
            snapshot,
            error,
            skipped: false,
        }
    }

    async fn fetch_remote(&self, filters: &FilterSet) -> Result<CollectionSnapshot<T>, ApiError> {
        let query = filters.to_query();
        let listing = self
            .client
            .list::<T, serde_json::Value>(T::RESOURCE, &query)
            .await?;

        let server_stats = listing.stats.and_then(|raw| {
            serde_json::from_value::<T::Stats>(raw)
                .inspect_err(|e| debug!(error = %e, "ignoring unreadable server statistics"))
                .ok()
        });

        debug!(resource = T::RESOURCE, count = listing.items.len(), "remote fetch complete");
        Ok(match server_stats {
            Some(stats) => {
                CollectionSnapshot::with_stats(listing.items, stats, DataSource::Remote, filters.clone())
            }
            None => CollectionSnapshot::derived(listing.items, DataSource::Remote, filters.clone()),
        })
    }

    // ── Internal helpers ─────────────────────────────────────────────

    /// Rebuild the collection from the fallback repository with the current
    /// filters. Statistics are recomputed from the rebuilt collection.
    pub(crate) fn rebuild_from_fallback(&self) -> Arc<CollectionSnapshot<T>> {
        let filters = self.filters();
        let signature = filters.signature();
        let items = self.fallback.list(&filters);
        self.publish(
            CollectionSnapshot::derived(items, DataSource::Fallback, filters),
            signature,
        )
    }

    /// Retain `err` for diagnostics and hand it to the notification sink.
    pub(crate) fn surface(&self, notification: Notification) {
        if let Some(err) = &notification.error {
            self.last_error.send_replace(Some(err.clone()));
        }
        self.notifier.notify(notification);
    }

    fn publish(&self, snapshot: CollectionSnapshot<T>, signature: String) -> Arc<CollectionSnapshot<T>> {
        let snapshot = Arc::new(snapshot);
        self.snapshot.send_replace(Arc::clone(&snapshot));
        *self.last_signature.lock().unwrap_or_else(PoisonError::into_inner) = Some(signature);
        snapshot
    }

    fn signature_matches(&self, signature: &str) -> bool {
        self.last_signature
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_deref()
            == Some(signature)
    }

    fn touch_sync(&self, at: Option<DateTime<Utc>>) {
        *self.last_sync.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }
}

/// Project `filters` onto the key set of `T`.
fn normalize<T: EntityKind>(filters: &FilterSet) -> FilterSet {
    let defaults = T::default_filters();
    let keys: Vec<&str> = defaults.keys().collect();
    defaults.merged(
        keys.into_iter()
            .map(|k| (k, filters.get(k).clone())),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{FilterValue, Station};

    #[test]
    fn normalize_fills_missing_keys_and_drops_unknown_ones() {
        let partial = FilterSet::new(&["status", "colour"])
            .with("status", "ACTIVE")
            .with("colour", "red");
        let normalized = normalize::<Station>(&partial);
        assert_eq!(normalized.keys().collect::<Vec<_>>(), Station::FILTER_KEYS);
        assert_eq!(normalized.value("status"), Some("ACTIVE"));
        assert_eq!(normalized.get("region"), &FilterValue::All);
        assert!(!normalized.recognizes("colour"));
    }
}
