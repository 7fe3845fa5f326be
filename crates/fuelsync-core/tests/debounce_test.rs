// Filter debouncing against an offline store, driven by tokio's paused clock.

#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use url::Url;

use common::{RecordingRepository, parts};
use fuelsync_api::ApiClient;
use fuelsync_core::{
    CollectingSink, DataSource, EntityKind, EntityManager, FallbackRepository, FilterValue, OfflineMutationPolicy,
    StaticStatusProvider, StaticToken, Station,
};

fn offline_stations() -> (EntityManager<Station>, Arc<RecordingRepository<Station>>) {
    let client = Arc::new(ApiClient::with_client(
        reqwest::Client::new(),
        Url::parse("http://127.0.0.1:9/api").unwrap(),
        Arc::new(StaticToken::anonymous()),
    ));
    let parts = parts(
        client,
        Arc::new(StaticStatusProvider::offline()),
        Arc::new(CollectingSink::new()),
        OfflineMutationPolicy::ApplyLocally,
    );
    let repo = Arc::new(RecordingRepository::<Station>::seeded());
    let fallback: Arc<dyn FallbackRepository<Station>> = repo.clone();
    let manager = EntityManager::new(&parts, fallback);
    (manager, repo)
}

#[tokio::test(start_paused = true)]
async fn test_two_quick_edits_produce_one_fetch() {
    let (stations, repo) = offline_stations();

    let first = stations.update_filters([("status", FilterValue::from("ACTIVE"))]);
    assert_eq!(first.value("status"), Some("ACTIVE"));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let merged = stations.update_filters([("region", FilterValue::from("Ashanti"))]);
    assert_eq!(merged.value("status"), Some("ACTIVE"));
    assert_eq!(merged.value("region"), Some("Ashanti"));
    // Stored immediately, fetched later.
    assert_eq!(stations.filters(), merged);
    assert!(repo.reads().is_empty());

    tokio::time::sleep(Duration::from_millis(400)).await;

    let reads = repo.reads();
    assert_eq!(reads.len(), 1);
    assert_eq!(reads[0], merged);

    let snapshot = stations.snapshot();
    assert_eq!(snapshot.source, DataSource::Fallback);
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.stats.active, 2);
}

#[tokio::test(start_paused = true)]
async fn test_typing_burst_fetches_only_the_final_term() {
    let (stations, repo) = offline_stations();

    for term in ["t", "ta", "tam", "tama", "tamale"] {
        stations.update_filters([("search", FilterValue::from(term))]);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(repo.reads().is_empty());

    tokio::time::sleep(Duration::from_secs(1)).await;

    let reads = repo.reads();
    assert_eq!(reads.len(), 1);
    assert_eq!(reads[0].value("search"), Some("tamale"));
    assert_eq!(stations.snapshot().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_edits_separated_by_the_window_fetch_twice() {
    let (stations, repo) = offline_stations();

    stations.update_filters([("region", FilterValue::from("Volta"))]);
    tokio::time::sleep(Duration::from_millis(500)).await;
    stations.update_filters([("region", FilterValue::All)]);
    tokio::time::sleep(Duration::from_millis(500)).await;

    let reads = repo.reads();
    assert_eq!(reads.len(), 2);
    assert_eq!(reads[0].value("region"), Some("Volta"));
    assert!(reads[1].is_unconstrained());
}

#[tokio::test(start_paused = true)]
async fn test_refresh_cancels_the_pending_fetch() {
    let (stations, repo) = offline_stations();

    stations.update_filters([("status", FilterValue::from("INACTIVE"))]);
    assert!(stations.debouncer().is_pending());

    let outcome = stations.refresh().await;
    assert_eq!(outcome.snapshot.filters.value("status"), Some("INACTIVE"));
    assert!(!stations.debouncer().is_pending());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(repo.reads().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reset_restores_unconstrained_filters() {
    let (stations, repo) = offline_stations();

    stations.update_filters([("status", FilterValue::from("MAINTENANCE"))]);
    let reset = stations.reset_filters();
    assert!(reset.is_unconstrained());

    tokio::time::sleep(Duration::from_secs(1)).await;
    let reads = repo.reads();
    assert_eq!(reads.len(), 1);
    assert!(reads[0].is_unconstrained());
    assert_eq!(stations.snapshot().len(), Station::seed().len());
}
