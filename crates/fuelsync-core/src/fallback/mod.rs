// ── Offline fallback repository ──
//
// Local stand-in for the backend, consulted when the connection provider
// reports the backend unreachable. Filtering goes through the same
// `EntityKind::matches` predicate the remote query encodes.

pub mod seed;

use std::sync::{PoisonError, RwLock};

use indexmap::IndexMap;

use crate::entity::EntityKind;
use crate::model::{EntityId, FilterSet};

/// Storage consulted and written by the offline path of a store.
pub trait FallbackRepository<T: EntityKind>: Send + Sync {
    /// Records matching `filters`, in insertion order.
    fn list(&self, filters: &FilterSet) -> Vec<T>;

    fn get(&self, id: &EntityId) -> Option<T>;

    /// Insert a new record, or overwrite one with the same id.
    fn insert(&self, entity: T);

    /// Overwrite an existing record. Returns `false` if the id is unknown.
    fn replace(&self, entity: T) -> bool;

    fn remove(&self, id: &EntityId) -> Option<T>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local repository backed by an ordered map.
pub struct InMemoryRepository<T: EntityKind> {
    entries: RwLock<IndexMap<EntityId, T>>,
}

impl<T: EntityKind> InMemoryRepository<T> {
    pub fn new(items: Vec<T>) -> Self {
        let entries = items.into_iter().map(|e| (e.id().clone(), e)).collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Repository preloaded with the type's seed dataset.
    pub fn seeded() -> Self {
        Self::new(T::seed())
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: EntityKind> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::seeded()
    }
}

impl<T: EntityKind> FallbackRepository<T> for InMemoryRepository<T> {
    fn list(&self, filters: &FilterSet) -> Vec<T> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.values().filter(|e| e.matches(filters)).cloned().collect()
    }

    fn get(&self, id: &EntityId) -> Option<T> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(id).cloned()
    }

    fn insert(&self, entity: T) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(entity.id().clone(), entity);
    }

    fn replace(&self, entity: T) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get_mut(entity.id()) {
            Some(slot) => {
                *slot = entity;
                true
            }
            None => false,
        }
    }

    fn remove(&self, id: &EntityId) -> Option<T> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.shift_remove(id)
    }

    fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}
