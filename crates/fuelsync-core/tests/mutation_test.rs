// Integration tests for `MutationCoordinator` using wiremock.

#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{FilteringBackend, client_for, list_body, parts, pinned_manager};
use fuelsync_core::{
    Assignee, CollectingSink, ConnectionStatusProvider, DataSource, EntityId, EntityKind, EntityManager,
    ErrorCode,
    InMemoryRepository, MutationOutcome, MutationState, NotificationLevel, OfflineMutationPolicy,
    StaticStatusProvider, StaticToken, Station, StationDraft, StationPatch, StationStatus, User,
    WashingBayEntry,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn draft(code: &str) -> StationDraft {
    StationDraft {
        code: code.into(),
        name: "Suame Magazine".into(),
        region: "Ashanti".into(),
        location: "Suame, Kumasi".into(),
        pump_count: 4,
        fuel_types: vec!["Petrol".into(), "Diesel".into()],
        ..StationDraft::default()
    }
}

fn created_station() -> Station {
    let mut station = Station::seed().remove(0);
    station.id = EntityId::from("st-100");
    station.code = "AS-100".into();
    station.name = "Suame Magazine".into();
    station
}

fn offline_manager(policy: OfflineMutationPolicy) -> (EntityManager<Station>, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::new());
    // Never contacted: the provider reports the backend unreachable.
    let client = Arc::new(fuelsync_api::ApiClient::with_client(
        reqwest::Client::new(),
        url::Url::parse("http://127.0.0.1:9/api").unwrap(),
        Arc::new(StaticToken::anonymous()),
    ));
    let parts = parts(client, Arc::new(StaticStatusProvider::offline()), Arc::clone(&sink), policy);
    let manager = EntityManager::new(&parts, Arc::new(InMemoryRepository::<Station>::seeded()));
    (manager, sink)
}

// ── Single-flight ───────────────────────────────────────────────────

#[tokio::test]
async fn test_second_mutation_is_refused_while_one_is_submitting() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/stations"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "success": true, "data": created_station() }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(&[created_station()])))
        .mount(&server)
        .await;

    let (stations, _sink) = pinned_manager::<Station>(&server, true);
    let before = stations.snapshot();

    let creator = stations.clone();
    let in_flight = tokio::spawn(async move { creator.create(draft("AS-100")).await });

    let mut state = stations.mutations().watch_state();
    state.wait_for(|s| *s == MutationState::Submitting).await.unwrap();

    let target = EntityId::from("st-001");
    let refused = [
        stations.create(draft("AS-101")).await,
        stations.update(target.clone(), StationPatch::default()).await,
        stations.delete(target.clone()).await,
        stations.change_status(target.clone(), StationStatus::Inactive).await,
        stations
            .assign(target.clone(), Assignee::new("usr-004", "Ama Owusu"))
            .await,
        stations.unassign(target).await,
    ];
    for outcome in &refused {
        assert!(matches!(outcome, MutationOutcome::Busy), "{outcome:?}");
    }
    assert!(Arc::ptr_eq(&before, &stations.snapshot()));

    let outcome = in_flight.await.unwrap();
    assert!(outcome.accepted());
    assert_eq!(outcome.entity().unwrap().id, EntityId::from("st-100"));
    assert_eq!(stations.mutation_state(), MutationState::Idle);
}

// ── Remote mutations ────────────────────────────────────────────────

#[tokio::test]
async fn test_create_then_refetch_does_not_duplicate() {
    let server = MockServer::start().await;
    let seed = Station::seed();
    let mut after: Vec<Station> = seed.clone();
    after.push(created_station());

    Mock::given(method("GET"))
        .and(path("/api/stations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(&seed)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(&after)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/stations"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "success": true, "data": created_station() })))
        .expect(1)
        .mount(&server)
        .await;

    let (stations, sink) = pinned_manager::<Station>(&server, true);
    assert_eq!(stations.refresh().await.snapshot.len(), seed.len());

    let outcome = stations.create(draft("AS-100")).await;
    assert!(outcome.accepted());

    let snapshot = stations.snapshot();
    assert_eq!(snapshot.source, DataSource::Remote);
    assert_eq!(snapshot.len(), seed.len() + 1);
    assert_eq!(snapshot.occurrences(&EntityId::from("st-100")), 1);
    assert_eq!(snapshot.stats.total as usize, seed.len() + 1);

    let notes = sink.drain();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Success);
}

#[tokio::test]
async fn test_empty_body_on_delete_is_success() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/stations/st-005"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(&Station::seed())))
        .mount(&server)
        .await;

    let (stations, _sink) = pinned_manager::<Station>(&server, true);
    let outcome = stations.delete(EntityId::from("st-005")).await;

    assert!(matches!(
        outcome,
        MutationOutcome::Applied {
            source: DataSource::Remote,
            entity: None
        }
    ));
    assert!(stations.last_error().is_none());
}

#[tokio::test]
async fn test_status_and_assignment_use_sub_resources() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/stations/st-003/status"))
        .and(body_json(json!({ "status": "MAINTENANCE" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/stations/st-003/manager"))
        .and(body_json(json!({ "assigneeId": "usr-004", "assigneeName": "Ama Owusu" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/users/usr-002/station"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": [] })))
        .mount(&server)
        .await;

    let (stations, _) = pinned_manager::<Station>(&server, true);
    let (users, _) = pinned_manager::<User>(&server, true);

    assert!(
        stations
            .change_status(EntityId::from("st-003"), StationStatus::Maintenance)
            .await
            .accepted()
    );
    assert!(
        stations
            .assign(EntityId::from("st-003"), Assignee::new("usr-004", "Ama Owusu"))
            .await
            .accepted()
    );
    assert!(users.unassign(EntityId::from("usr-002")).await.accepted());
}

#[tokio::test]
async fn test_rejected_mutation_leaves_collection_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(&Station::seed())))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/stations/st-001"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({ "success": false, "message": "Station code already in use" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (stations, sink) = pinned_manager::<Station>(&server, true);
    stations.refresh().await;
    let before = stations.snapshot();

    let patch = StationPatch {
        code: Some("AS-002".into()),
        ..StationPatch::default()
    };
    let outcome = stations.update(EntityId::from("st-001"), patch).await;

    let err = outcome.error().unwrap();
    assert_eq!(err.code, ErrorCode::Rejected);
    assert_eq!(err.message, "Station code already in use");
    assert_eq!(err.related_id, Some(EntityId::from("st-001")));
    assert!(Arc::ptr_eq(&before, &stations.snapshot()));
    assert_eq!(stations.last_error().unwrap(), *err);

    let notes = sink.drain();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Error);
}

#[tokio::test]
async fn test_invalid_draft_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let (stations, _sink) = pinned_manager::<Station>(&server, true);
    let outcome = stations.create(draft("station one")).await;

    assert_eq!(outcome.error().unwrap().code, ErrorCode::Validation);
    assert_eq!(stations.mutation_state(), MutationState::Idle);
}

#[tokio::test]
async fn test_ledger_entries_cannot_be_assigned() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (ledger, _sink) = pinned_manager::<WashingBayEntry>(&server, true);
    let outcome = ledger
        .assign(EntityId::from("wb-001"), Assignee::new("usr-001", "Yaw Boateng"))
        .await;
    assert_eq!(outcome.error().unwrap().code, ErrorCode::Unsupported);
}

// ── Offline mutations ───────────────────────────────────────────────

#[tokio::test]
async fn test_offline_create_updates_collection_and_statistics() {
    let (stations, sink) = offline_manager(OfflineMutationPolicy::ApplyLocally);
    let loaded = stations.refresh().await;
    assert_eq!(loaded.source(), DataSource::Fallback);
    let total_before = loaded.snapshot.stats.total;

    let outcome = stations.create(draft("AS-100")).await;
    let MutationOutcome::Applied {
        source: DataSource::Fallback,
        entity: Some(created),
    } = outcome
    else {
        panic!("expected an offline create, got {outcome:?}");
    };
    assert!(created.id.as_uuid().is_some());
    assert!(created.created_at.is_some());

    let snapshot = stations.snapshot();
    assert_eq!(snapshot.stats.total, total_before + 1);
    assert_eq!(snapshot.occurrences(&created.id), 1);

    let notes = sink.drain();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Warning);
}

#[tokio::test]
async fn test_offline_delete_and_status_change_recompute_statistics() {
    let (stations, _sink) = offline_manager(OfflineMutationPolicy::ApplyLocally);
    let before = stations.refresh().await.snapshot;

    assert!(stations.delete(EntityId::from("st-008")).await.accepted());
    assert!(
        stations
            .change_status(EntityId::from("st-005"), StationStatus::Active)
            .await
            .accepted()
    );

    let after = stations.snapshot();
    assert_eq!(after.stats.total, before.stats.total - 1);
    assert_eq!(after.stats.inactive, 0);
    assert_eq!(after.stats.active, before.stats.active + 1);
    assert!(after.get(&EntityId::from("st-008")).is_none());
}

#[tokio::test]
async fn test_offline_unassign_without_manager_is_rejected_locally() {
    let (stations, _sink) = offline_manager(OfflineMutationPolicy::ApplyLocally);
    stations.refresh().await;
    let before = stations.snapshot();

    let outcome = stations.unassign(EntityId::from("st-003")).await;
    let err = outcome.error().unwrap();
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(err.related_id, Some(EntityId::from("st-003")));
    assert!(Arc::ptr_eq(&before, &stations.snapshot()));
}

#[tokio::test]
async fn test_reject_policy_refuses_offline_mutations() {
    let (stations, _sink) = offline_manager(OfflineMutationPolicy::Reject);
    let before = stations.refresh().await.snapshot;

    let outcome = stations.delete(EntityId::from("st-001")).await;
    assert_eq!(outcome.error().unwrap().code, ErrorCode::Connectivity);

    let after = stations.refresh().await.snapshot;
    assert_eq!(after.len(), before.len());
    assert!(after.get(&EntityId::from("st-001")).is_some());
}

#[tokio::test]
async fn test_unreachable_server_with_apply_locally_uses_fallback() {
    let server = MockServer::start().await;
    let sink = Arc::new(CollectingSink::new());
    let status = Arc::new(StaticStatusProvider::new(true, server.uri()));
    let provider: Arc<dyn ConnectionStatusProvider> = status.clone();
    let parts = parts(
        client_for(&server),
        provider,
        Arc::clone(&sink),
        OfflineMutationPolicy::ApplyLocally,
    );
    let stations = EntityManager::<Station>::new(&parts, Arc::new(InMemoryRepository::seeded()));

    status.set_connected(false);
    let outcome = stations.delete(EntityId::from("st-002")).await;
    assert!(matches!(
        outcome,
        MutationOutcome::Applied {
            source: DataSource::Fallback,
            ..
        }
    ));
    assert!(stations.snapshot().get(&EntityId::from("st-002")).is_none());
}

// ── Filters survive mutations ───────────────────────────────────────

#[tokio::test]
async fn test_offline_mutation_keeps_fetched_filters() {
    let (stations, _sink) = offline_manager(OfflineMutationPolicy::ApplyLocally);
    let active = Station::default_filters().with("status", "ACTIVE");

    let fetched = stations.store().fetch(&active, false).await;
    assert_eq!(fetched.snapshot.len(), 5);
    assert_eq!(stations.filters(), active);

    let outcome = stations
        .change_status(EntityId::from("st-005"), StationStatus::Active)
        .await;
    assert!(outcome.accepted());

    let snapshot = stations.snapshot();
    assert_eq!(snapshot.source, DataSource::Fallback);
    assert_eq!(snapshot.filters, active);
    assert_eq!(snapshot.len(), 6);
    assert!(snapshot.items.iter().all(|s| s.status == StationStatus::Active));
    assert_eq!(snapshot.stats.inactive, 0);
}

#[tokio::test]
async fn test_remote_refetch_after_mutation_keeps_fetched_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stations"))
        .respond_with(FilteringBackend::<Station>::seeded())
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/stations/st-005/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let (stations, _sink) = pinned_manager::<Station>(&server, true);
    let active = Station::default_filters().with("status", "ACTIVE");
    assert_eq!(stations.store().fetch(&active, false).await.snapshot.len(), 5);

    let outcome = stations
        .change_status(EntityId::from("st-005"), StationStatus::Active)
        .await;
    assert!(outcome.accepted());

    let snapshot = stations.snapshot();
    assert_eq!(snapshot.source, DataSource::Remote);
    assert_eq!(snapshot.filters, active);
    assert!(snapshot.items.iter().all(|s| s.status == StationStatus::Active));
    assert_eq!(snapshot.stats.inactive, 0);
}
