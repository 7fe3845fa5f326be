// ── Entity manager ──
//
// What a screen (or the CLI) holds for one collection: the store, its
// mutation coordinator and its filter debouncer behind one cloneable
// handle.

use std::sync::Arc;
use std::time::Duration;

use fuelsync_api::{ApiClient, ConnectionStatus};

use crate::config::OfflineMutationPolicy;
use crate::connection::ConnectionStatusProvider;
use crate::debounce::FilterDebouncer;
use crate::entity::{Assignee, EntityKind};
use crate::error::ApiError;
use crate::fallback::FallbackRepository;
use crate::model::{EntityId, FilterSet, FilterValue};
use crate::mutation::{MutationCoordinator, MutationOutcome, MutationState};
use crate::notify::NotificationSink;
use crate::store::{CollectionSnapshot, CollectionSubscription, FetchOutcome, SyncedCollectionStore};

/// Cheaply cloneable handle over one synchronized collection.
pub struct EntityManager<T: EntityKind> {
    inner: Arc<ManagerInner<T>>,
}

impl<T: EntityKind> Clone for EntityManager<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ManagerInner<T: EntityKind> {
    store: Arc<SyncedCollectionStore<T>>,
    mutations: MutationCoordinator<T>,
    debouncer: FilterDebouncer<T>,
}

/// Collaborators shared by every manager of one console.
#[derive(Clone)]
pub struct SharedParts {
    pub client: Arc<ApiClient>,
    pub status: Arc<dyn ConnectionStatusProvider>,
    pub notifier: Arc<dyn NotificationSink>,
    pub offline_policy: OfflineMutationPolicy,
    pub debounce_window: Duration,
}

impl<T: EntityKind> EntityManager<T> {
    pub fn new(parts: &SharedParts, fallback: Arc<dyn FallbackRepository<T>>) -> Self {
        let store = Arc::new(SyncedCollectionStore::new(
            Arc::clone(&parts.client),
            Arc::clone(&parts.status),
            fallback,
            Arc::clone(&parts.notifier),
        ));
        let mutations = MutationCoordinator::new(Arc::clone(&store), parts.offline_policy);
        let debouncer = FilterDebouncer::new(Arc::clone(&store), parts.debounce_window);

        Self {
            inner: Arc::new(ManagerInner {
                store,
                mutations,
                debouncer,
            }),
        }
    }

    pub fn store(&self) -> &Arc<SyncedCollectionStore<T>> {
        &self.inner.store
    }

    pub fn mutations(&self) -> &MutationCoordinator<T> {
        &self.inner.mutations
    }

    pub fn debouncer(&self) -> &FilterDebouncer<T> {
        &self.inner.debouncer
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<CollectionSnapshot<T>> {
        self.inner.store.snapshot()
    }

    pub fn subscribe(&self) -> CollectionSubscription<T> {
        self.inner.store.subscribe()
    }

    pub fn filters(&self) -> FilterSet {
        self.inner.store.filters()
    }

    pub fn last_error(&self) -> Option<ApiError> {
        self.inner.store.last_error()
    }

    pub fn connection_status(&self) -> Option<ConnectionStatus> {
        self.inner.store.connection_status()
    }

    pub fn mutation_state(&self) -> MutationState {
        self.inner.mutations.state()
    }

    /// Forced fetch with the current filters.
    pub async fn refresh(&self) -> FetchOutcome<T> {
        self.inner.debouncer.cancel();
        self.inner.store.refresh().await
    }

    /// Fetch with the current filters, skipped if nothing changed since
    /// the last fetch.
    pub async fn load(&self) -> FetchOutcome<T> {
        let filters = self.filters();
        self.inner.store.fetch(&filters, false).await
    }

    /// Merge `changes` into the current filters and schedule a debounced
    /// fetch with the result. Returns the new filter set.
    pub fn update_filters<'a, I>(&self, changes: I) -> FilterSet
    where
        I: IntoIterator<Item = (&'a str, FilterValue)>,
    {
        let next = self.filters().merged(changes);
        self.inner.store.set_filters(&next);
        self.inner.debouncer.schedule(next.clone());
        next
    }

    /// Put every filter back to `ALL` and schedule a debounced fetch.
    pub fn reset_filters(&self) -> FilterSet {
        let defaults = T::default_filters();
        self.inner.store.set_filters(&defaults);
        self.inner.debouncer.schedule(defaults.clone());
        defaults
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub async fn create(&self, draft: T::Draft) -> MutationOutcome<T> {
        self.inner.mutations.create(draft).await
    }

    pub async fn update(&self, id: EntityId, patch: T::Patch) -> MutationOutcome<T> {
        self.inner.mutations.update(id, patch).await
    }

    pub async fn delete(&self, id: EntityId) -> MutationOutcome<T> {
        self.inner.mutations.delete(id).await
    }

    pub async fn change_status(&self, id: EntityId, status: T::Status) -> MutationOutcome<T> {
        self.inner.mutations.change_status(id, status).await
    }

    pub async fn assign(&self, id: EntityId, assignee: Assignee) -> MutationOutcome<T> {
        self.inner.mutations.assign(id, assignee).await
    }

    pub async fn unassign(&self, id: EntityId) -> MutationOutcome<T> {
        self.inner.mutations.unassign(id).await
    }
}
