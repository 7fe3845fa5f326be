// ── Published collection snapshots ──
//
// A snapshot is replaced wholesale on every completed fetch or offline
// mutation. Items and statistics always come from the same source.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::EntityKind;
use crate::model::{EntityId, FilterSet};

/// Where the current collection came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DataSource {
    /// Nothing fetched yet.
    #[default]
    Unloaded,
    /// Backend list endpoint.
    Remote,
    /// Local fallback repository.
    Fallback,
}

/// Immutable view of one collection and its statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSnapshot<T: EntityKind> {
    pub items: Vec<T>,
    pub stats: T::Stats,
    pub source: DataSource,
    /// Filters the items were selected with.
    pub filters: FilterSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl<T: EntityKind> CollectionSnapshot<T> {
    pub(crate) fn unloaded() -> Self {
        Self {
            items: Vec::new(),
            stats: T::Stats::default(),
            source: DataSource::Unloaded,
            filters: T::default_filters(),
            fetched_at: None,
        }
    }

    /// Snapshot whose statistics are computed from `items`.
    pub(crate) fn derived(items: Vec<T>, source: DataSource, filters: FilterSet) -> Self {
        let stats = T::compute_stats(&items);
        Self::with_stats(items, stats, source, filters)
    }

    pub(crate) fn with_stats(items: Vec<T>, stats: T::Stats, source: DataSource, filters: FilterSet) -> Self {
        Self {
            items,
            stats,
            source,
            filters,
            fetched_at: Some(Utc::now()),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &EntityId) -> Option<&T> {
        self.items.iter().find(|e| e.id() == id)
    }

    /// How many items carry `id`.
    pub fn occurrences(&self, id: &EntityId) -> usize {
        self.items.iter().filter(|e| e.id() == id).count()
    }
}
