// Shared fixtures for the fuelsync-core integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

use fuelsync_api::{ApiClient, ConnectionMonitor, RetryPolicy, StaticToken};
use fuelsync_core::{
    CollectingSink, ConnectionStatusProvider, EntityId, EntityKind, EntityManager, FallbackRepository,
    FilterSet, InMemoryRepository, OfflineMutationPolicy, ProbingStatusProvider, SharedParts,
    StaticStatusProvider,
};

pub const PROBE_TIMEOUT: Duration = Duration::from_millis(150);

/// Retries with short delays so failing scenarios stay fast.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        attempts: 3,
        delay: Duration::from_millis(10),
        timeout: Duration::from_millis(500),
    }
}

pub fn api_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/api", server.uri())).unwrap()
}

pub fn client_for(server: &MockServer) -> Arc<ApiClient> {
    Arc::new(
        ApiClient::with_client(
            reqwest::Client::new(),
            api_url(server),
            Arc::new(StaticToken::anonymous()),
        )
        .with_retry(fast_retry()),
    )
}

pub fn probing_provider(server: &MockServer) -> Arc<ProbingStatusProvider> {
    let monitor =
        ConnectionMonitor::new(reqwest::Client::new(), &api_url(server), "health", PROBE_TIMEOUT).unwrap();
    Arc::new(ProbingStatusProvider::new(monitor))
}

pub fn parts(
    client: Arc<ApiClient>,
    status: Arc<dyn ConnectionStatusProvider>,
    notifier: Arc<CollectingSink>,
    offline_policy: OfflineMutationPolicy,
) -> SharedParts {
    SharedParts {
        client,
        status,
        notifier,
        offline_policy,
        debounce_window: Duration::from_millis(300),
    }
}

/// Manager over seeded fallback data, pinned to one connectivity state.
pub fn pinned_manager<T: EntityKind>(
    server: &MockServer,
    connected: bool,
) -> (EntityManager<T>, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::new());
    let parts = parts(
        client_for(server),
        Arc::new(StaticStatusProvider::new(connected, server.uri())),
        Arc::clone(&sink),
        OfflineMutationPolicy::ApplyLocally,
    );
    let manager = EntityManager::new(&parts, Arc::new(InMemoryRepository::<T>::seeded()));
    (manager, sink)
}

/// Manager whose reachability comes from the mock server's health endpoint.
pub fn probing_manager<T: EntityKind>(server: &MockServer) -> (EntityManager<T>, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::new());
    let parts = parts(
        client_for(server),
        probing_provider(server),
        Arc::clone(&sink),
        OfflineMutationPolicy::ApplyLocally,
    );
    let manager = EntityManager::new(&parts, Arc::new(InMemoryRepository::<T>::seeded()));
    (manager, sink)
}

pub fn ids<T: EntityKind>(items: &[T]) -> Vec<EntityId> {
    items.iter().map(|e| e.id().clone()).collect()
}

pub fn list_body<T: serde::Serialize>(items: &[T]) -> serde_json::Value {
    json!({ "success": true, "data": items })
}

// ── Fallback repository that records reads ──────────────────────────

pub struct RecordingRepository<T: EntityKind> {
    inner: InMemoryRepository<T>,
    reads: Mutex<Vec<FilterSet>>,
}

impl<T: EntityKind> RecordingRepository<T> {
    pub fn seeded() -> Self {
        Self {
            inner: InMemoryRepository::seeded(),
            reads: Mutex::new(Vec::new()),
        }
    }

    /// Filter sets passed to `list`, in call order.
    pub fn reads(&self) -> Vec<FilterSet> {
        self.reads.lock().unwrap().clone()
    }
}

impl<T: EntityKind> FallbackRepository<T> for RecordingRepository<T> {
    fn list(&self, filters: &FilterSet) -> Vec<T> {
        self.reads.lock().unwrap().push(filters.clone());
        self.inner.list(filters)
    }

    fn get(&self, id: &EntityId) -> Option<T> {
        self.inner.get(id)
    }

    fn insert(&self, entity: T) {
        self.inner.insert(entity);
    }

    fn replace(&self, entity: T) -> bool {
        self.inner.replace(entity)
    }

    fn remove(&self, id: &EntityId) -> Option<T> {
        self.inner.remove(id)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

// ── Mock backend that filters its seed dataset ──────────────────────

/// Answers list calls by decoding the query string into a filter set and
/// applying the same predicate the fallback repository uses.
pub struct FilteringBackend<T: EntityKind> {
    items: Vec<T>,
}

impl<T: EntityKind> FilteringBackend<T> {
    pub fn seeded() -> Self {
        Self { items: T::seed() }
    }
}

impl<T: EntityKind> Respond for FilteringBackend<T> {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let pairs: Vec<(String, String)> = request.url.query_pairs().into_owned().collect();
        let filters = FilterSet::from_query(
            T::FILTER_KEYS,
            pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );
        let matching: Vec<&T> = self.items.iter().filter(|e| e.matches(&filters)).collect();
        ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": matching }))
    }
}
