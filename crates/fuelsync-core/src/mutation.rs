// ── Mutation coordination ──
//
// Serializes create/update/delete/status/assign/unassign against one
// store. At most one mutation is in flight; a call made while another is
// submitting is refused without side effects. Online mutations are sent to
// the backend and followed by a forced refetch. Offline mutations (when the
// policy allows them) are written to the fallback repository and the
// collection is rebuilt from it.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::OfflineMutationPolicy;
use crate::entity::{Assignee, EntityKind, unsupported_assignment};
use crate::error::{ApiError, ErrorCode};
use crate::fallback::FallbackRepository;
use crate::model::EntityId;
use crate::notify::Notification;
use crate::store::{DataSource, SyncedCollectionStore};

// ── State & intents ─────────────────────────────────────────────────

/// Coordinator state machine: `Idle -> Submitting -> Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum MutationState {
    #[default]
    Idle,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "snake_case")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
    StatusChange,
    Assign,
    Unassign,
}

impl MutationKind {
    fn past_tense(self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Update => "updated",
            Self::Delete => "deleted",
            Self::StatusChange => "status changed",
            Self::Assign => "assigned",
            Self::Unassign => "unassigned",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::StatusChange => "change status of",
            Self::Assign => "assign",
            Self::Unassign => "unassign",
        }
    }
}

/// One requested mutation with its payload.
#[derive(Debug, Clone)]
pub enum MutationIntent<T: EntityKind> {
    Create(T::Draft),
    Update { id: EntityId, patch: T::Patch },
    Delete { id: EntityId },
    StatusChange { id: EntityId, status: T::Status },
    Assign { id: EntityId, assignee: Assignee },
    Unassign { id: EntityId },
}

impl<T: EntityKind> MutationIntent<T> {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Create(_) => MutationKind::Create,
            Self::Update { .. } => MutationKind::Update,
            Self::Delete { .. } => MutationKind::Delete,
            Self::StatusChange { .. } => MutationKind::StatusChange,
            Self::Assign { .. } => MutationKind::Assign,
            Self::Unassign { .. } => MutationKind::Unassign,
        }
    }

    pub fn target_id(&self) -> Option<&EntityId> {
        match self {
            Self::Create(_) => None,
            Self::Update { id, .. }
            | Self::Delete { id }
            | Self::StatusChange { id, .. }
            | Self::Assign { id, .. }
            | Self::Unassign { id } => Some(id),
        }
    }

    /// Local checks run before any network call.
    pub fn validate(&self) -> Result<(), ApiError> {
        match self {
            Self::Create(draft) => T::validate_draft(draft),
            Self::Update { patch, .. } => T::validate_patch(patch),
            Self::Assign { assignee, .. } => {
                if T::ASSIGNMENT.is_none() {
                    return Err(unsupported_assignment::<T>());
                }
                if assignee.assignee_name.trim().is_empty() {
                    return Err(ApiError::validation("assignee name is required"));
                }
                Ok(())
            }
            Self::Unassign { .. } if T::ASSIGNMENT.is_none() => Err(unsupported_assignment::<T>()),
            Self::Delete { .. } | Self::StatusChange { .. } | Self::Unassign { .. } => Ok(()),
        }
    }
}

/// Result of one mutation call.
#[derive(Debug, Clone)]
pub enum MutationOutcome<T: EntityKind> {
    /// The mutation went through.
    Applied {
        source: DataSource,
        /// The affected record, when one is known.
        entity: Option<T>,
    },
    /// Another mutation was in flight; nothing happened.
    Busy,
    /// Validation or the backend refused it; the collection is unchanged.
    Failed(ApiError),
}

impl<T: EntityKind> MutationOutcome<T> {
    pub fn accepted(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn entity(&self) -> Option<&T> {
        match self {
            Self::Applied { entity, .. } => entity.as_ref(),
            _ => None,
        }
    }
}

// ── Single-flight guard ─────────────────────────────────────────────

/// Holds the coordinator in `Submitting`; resets to `Idle` on drop.
struct SubmitGuard<'a> {
    state: &'a watch::Sender<MutationState>,
}

impl<'a> SubmitGuard<'a> {
    fn acquire(state: &'a watch::Sender<MutationState>) -> Option<Self> {
        let acquired = state.send_if_modified(|s| {
            if *s == MutationState::Idle {
                *s = MutationState::Submitting;
                true
            } else {
                false
            }
        });
        acquired.then_some(Self { state })
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.state.send_replace(MutationState::Idle);
    }
}

// ── Coordinator ─────────────────────────────────────────────────────

pub struct MutationCoordinator<T: EntityKind> {
    store: Arc<SyncedCollectionStore<T>>,
    offline_policy: OfflineMutationPolicy,
    state: watch::Sender<MutationState>,
}

impl<T: EntityKind> MutationCoordinator<T> {
    pub fn new(store: Arc<SyncedCollectionStore<T>>, offline_policy: OfflineMutationPolicy) -> Self {
        let (state, _) = watch::channel(MutationState::Idle);
        Self {
            store,
            offline_policy,
            state,
        }
    }

    pub fn state(&self) -> MutationState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<MutationState> {
        self.state.subscribe()
    }

    pub fn offline_policy(&self) -> OfflineMutationPolicy {
        self.offline_policy
    }

    pub async fn create(&self, draft: T::Draft) -> MutationOutcome<T> {
        self.submit(MutationIntent::Create(draft)).await
    }

    pub async fn update(&self, id: EntityId, patch: T::Patch) -> MutationOutcome<T> {
        self.submit(MutationIntent::Update { id, patch }).await
    }

    pub async fn delete(&self, id: EntityId) -> MutationOutcome<T> {
        self.submit(MutationIntent::Delete { id }).await
    }

    pub async fn change_status(&self, id: EntityId, status: T::Status) -> MutationOutcome<T> {
        self.submit(MutationIntent::StatusChange { id, status }).await
    }

    pub async fn assign(&self, id: EntityId, assignee: Assignee) -> MutationOutcome<T> {
        self.submit(MutationIntent::Assign { id, assignee }).await
    }

    pub async fn unassign(&self, id: EntityId) -> MutationOutcome<T> {
        self.submit(MutationIntent::Unassign { id }).await
    }

    /// Run one mutation through validation, the connection check, and the
    /// remote or offline path.
    pub async fn submit(&self, intent: MutationIntent<T>) -> MutationOutcome<T> {
        let kind = intent.kind();
        let Some(_guard) = SubmitGuard::acquire(&self.state) else {
            debug!(resource = T::RESOURCE, %kind, "mutation refused, another one is submitting");
            return MutationOutcome::Busy;
        };

        if let Err(e) = intent.validate() {
            return self.fail(kind, intent.target_id().cloned(), e);
        }

        let status = self.store.status_provider().status().await;
        if status.connected {
            return self.submit_remote(intent).await;
        }

        match self.offline_policy {
            OfflineMutationPolicy::ApplyLocally => self.apply_locally(intent),
            OfflineMutationPolicy::Reject => {
                let err = ApiError::new(
                    ErrorCode::Connectivity,
                    format!("backend at {} is unreachable", status.endpoint),
                );
                self.fail(kind, intent.target_id().cloned(), err)
            }
        }
    }

    // ── Remote path ──────────────────────────────────────────────────

    async fn submit_remote(&self, intent: MutationIntent<T>) -> MutationOutcome<T> {
        let kind = intent.kind();
        let target = intent.target_id().cloned();

        match self.send(intent).await {
            Ok(entity) => {
                info!(resource = T::RESOURCE, %kind, "mutation accepted by backend");
                let refreshed = self.store.refresh().await;
                if refreshed.error.is_some() {
                    debug!(resource = T::RESOURCE, "refetch after mutation fell back to local data");
                }
                self.store.notifier().notify(Notification::success(
                    format!("{} {}", T::LABEL, kind.past_tense()),
                    format!("{} {} successfully", T::LABEL, kind.past_tense()),
                ));
                MutationOutcome::Applied {
                    source: DataSource::Remote,
                    entity,
                }
            }
            Err(e) => self.fail(kind, target, e),
        }
    }

    async fn send(&self, intent: MutationIntent<T>) -> Result<Option<T>, ApiError> {
        let client = self.store.client();
        match intent {
            MutationIntent::Create(draft) => {
                let echoed = client
                    .create::<serde_json::Value, _>(T::RESOURCE, &draft)
                    .await?;
                Ok(echoed.and_then(decode_echo))
            }
            MutationIntent::Update { id, patch } => {
                let echoed = client
                    .update::<serde_json::Value, _>(T::RESOURCE, &id.as_segment(), &patch)
                    .await?;
                Ok(echoed.and_then(decode_echo))
            }
            MutationIntent::Delete { id } => {
                client.delete(T::RESOURCE, &id.as_segment()).await?;
                Ok(None)
            }
            MutationIntent::StatusChange { id, status } => {
                client
                    .put_sub(T::RESOURCE, &id.as_segment(), "status", &json!({ "status": status }))
                    .await?;
                Ok(None)
            }
            MutationIntent::Assign { id, assignee } => {
                let segment = T::ASSIGNMENT.ok_or_else(unsupported_assignment::<T>)?;
                client
                    .put_sub(T::RESOURCE, &id.as_segment(), segment, &assignee)
                    .await?;
                Ok(None)
            }
            MutationIntent::Unassign { id } => {
                let segment = T::ASSIGNMENT.ok_or_else(unsupported_assignment::<T>)?;
                client
                    .delete_sub(T::RESOURCE, &id.as_segment(), segment)
                    .await?;
                Ok(None)
            }
        }
    }

    // ── Offline path ─────────────────────────────────────────────────

    fn apply_locally(&self, intent: MutationIntent<T>) -> MutationOutcome<T> {
        let kind = intent.kind();
        let target = intent.target_id().cloned();

        match apply_to(self.store.fallback(), intent) {
            Ok(entity) => {
                let snapshot = self.store.rebuild_from_fallback();
                info!(
                    resource = T::RESOURCE,
                    %kind,
                    count = snapshot.len(),
                    "mutation applied to offline data"
                );
                self.store.notifier().notify(Notification::warning(
                    format!("{} {} offline", T::LABEL, kind.past_tense()),
                    "The change was saved locally and will not reach the server.",
                ));
                MutationOutcome::Applied {
                    source: DataSource::Fallback,
                    entity,
                }
            }
            Err(e) => self.fail(kind, target, e),
        }
    }

    fn fail(&self, kind: MutationKind, target: Option<EntityId>, err: ApiError) -> MutationOutcome<T> {
        let err = match target {
            Some(id) if err.related_id.is_none() => err.with_related(id),
            _ => err,
        };
        warn!(resource = T::RESOURCE, %kind, code = %err.code, error = %err.message, "mutation failed");
        self.store.surface(Notification::failure(
            format!("Could not {} {}", kind.verb(), T::LABEL.to_lowercase()),
            err.clone(),
        ));
        MutationOutcome::Failed(err)
    }
}

fn decode_echo<T: EntityKind>(value: serde_json::Value) -> Option<T> {
    serde_json::from_value(value)
        .inspect_err(|e| debug!(error = %e, "backend echo is not a full record"))
        .ok()
}

/// Apply one intent to a repository, synthesizing ids and timestamps.
fn apply_to<T: EntityKind>(
    repo: &dyn FallbackRepository<T>,
    intent: MutationIntent<T>,
) -> Result<Option<T>, ApiError> {
    let now = Utc::now();
    let existing = |id: &EntityId| repo.get(id).ok_or_else(|| ApiError::not_found(T::LABEL, id));

    let updated = match intent {
        MutationIntent::Create(draft) => {
            let entity = T::from_draft(EntityId::generate(), draft, now);
            repo.insert(entity.clone());
            return Ok(Some(entity));
        }
        MutationIntent::Delete { id } => {
            return repo
                .remove(&id)
                .map(|_| None)
                .ok_or_else(|| ApiError::not_found(T::LABEL, &id));
        }
        MutationIntent::Update { id, patch } => {
            let mut entity = existing(&id)?;
            entity.apply_patch(patch, now);
            entity
        }
        MutationIntent::StatusChange { id, status } => {
            let mut entity = existing(&id)?;
            entity.set_status(status, now);
            entity
        }
        MutationIntent::Assign { id, assignee } => {
            let mut entity = existing(&id)?;
            entity.assign(&assignee, now)?;
            entity
        }
        MutationIntent::Unassign { id } => {
            let mut entity = existing(&id)?;
            entity.unassign(now)?;
            entity
        }
    };

    repo.replace(updated.clone());
    Ok(Some(updated))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fallback::InMemoryRepository;
    use crate::model::{Station, StationStatus, WashingBayEntry};

    #[test]
    fn guard_is_exclusive_and_resets() {
        let (state, _) = watch::channel(MutationState::Idle);
        let guard = SubmitGuard::acquire(&state).unwrap();
        assert_eq!(*state.borrow(), MutationState::Submitting);
        assert!(SubmitGuard::acquire(&state).is_none());
        drop(guard);
        assert_eq!(*state.borrow(), MutationState::Idle);
        assert!(SubmitGuard::acquire(&state).is_some());
    }

    #[test]
    fn assign_is_unsupported_for_ledger_entries() {
        let intent = MutationIntent::<WashingBayEntry>::Unassign {
            id: EntityId::from("wb-001"),
        };
        assert_eq!(intent.validate().unwrap_err().code, ErrorCode::Unsupported);
        assert_eq!(intent.kind().to_string(), "unassign");
    }

    #[test]
    fn local_status_change_updates_timestamp() {
        let repo = InMemoryRepository::<Station>::seeded();
        let before = repo.get(&EntityId::from("st-003")).unwrap();
        let after = apply_to(
            &repo,
            MutationIntent::StatusChange {
                id: EntityId::from("st-003"),
                status: StationStatus::Active,
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(after.status, StationStatus::Active);
        assert!(after.updated_at > before.updated_at);
    }

    #[test]
    fn local_delete_of_unknown_id_is_not_found() {
        let repo = InMemoryRepository::<Station>::seeded();
        let err = apply_to(
            &repo,
            MutationIntent::Delete {
                id: EntityId::from("st-404"),
            },
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.related_id, Some(EntityId::from("st-404")));
    }
}
