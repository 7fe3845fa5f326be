// ── Entity kinds ──
//
// Everything the generic store, fallback repository and mutation
// coordinator need to know about one entity type: where it lives on the
// backend, how its filters match, how its statistics are derived, and how
// offline mutations are applied.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::model::{EntityId, FilterSet};

/// Target of an assign operation, sent as `{assigneeId, assigneeName}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    pub assignee_id: EntityId,
    pub assignee_name: String,
}

impl Assignee {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            assignee_id: id.into(),
            assignee_name: name.into(),
        }
    }
}

/// Static description of a synchronized entity type.
pub trait EntityKind:
    fmt::Debug + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Collection path under the API base, e.g. `stations`.
    const RESOURCE: &'static str;

    /// Human label used in messages, e.g. `Station`.
    const LABEL: &'static str;

    /// Recognized filter keys, in display order.
    const FILTER_KEYS: &'static [&'static str];

    /// Path segment for assign/unassign, if the type supports them.
    const ASSIGNMENT: Option<&'static str> = None;

    /// Create payload.
    type Draft: fmt::Debug + Clone + Serialize + Send + Sync + 'static;

    /// Partial update payload.
    type Patch: fmt::Debug + Clone + Serialize + Send + Sync + 'static;

    /// Lifecycle status values accepted by the status endpoint.
    type Status: fmt::Debug + fmt::Display + Copy + Serialize + Send + Sync + 'static;

    /// Aggregate describing a collection of this type.
    type Stats: fmt::Debug
        + Clone
        + Default
        + PartialEq
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    fn id(&self) -> &EntityId;

    /// The predicate the backend applies for `filters`.
    fn matches(&self, filters: &FilterSet) -> bool;

    fn compute_stats(items: &[Self]) -> Self::Stats;

    fn validate_draft(draft: &Self::Draft) -> Result<(), ApiError>;

    fn validate_patch(patch: &Self::Patch) -> Result<(), ApiError>;

    /// Materialize a draft locally, with synthesized id and timestamps.
    fn from_draft(id: EntityId, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    fn apply_patch(&mut self, patch: Self::Patch, now: DateTime<Utc>);

    fn set_status(&mut self, status: Self::Status, now: DateTime<Utc>);

    /// Record an assignment locally.
    fn assign(&mut self, assignee: &Assignee, now: DateTime<Utc>) -> Result<(), ApiError> {
        let _ = (assignee, now);
        Err(unsupported_assignment::<Self>())
    }

    /// Clear an assignment locally. Clearing an empty assignment is a
    /// validation error.
    fn unassign(&mut self, now: DateTime<Utc>) -> Result<(), ApiError> {
        let _ = now;
        Err(unsupported_assignment::<Self>())
    }

    /// Data served while the backend is unreachable.
    fn seed() -> Vec<Self>;

    /// An empty filter set for this type.
    fn default_filters() -> FilterSet {
        FilterSet::new(Self::FILTER_KEYS)
    }
}

pub(crate) fn unsupported_assignment<T: EntityKind>() -> ApiError {
    ApiError::unsupported(format!("{} records cannot be assigned", T::LABEL))
}

// ── Shared validation helpers ───────────────────────────────────────

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

pub(crate) fn require_opt_text(field: &str, value: Option<&String>) -> Result<(), ApiError> {
    value.map_or(Ok(()), |v| require_text(field, v))
}
