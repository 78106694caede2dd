// ── Component registry ──
//
// In-memory table of mounted entities. Each record carries three
// configuration snapshots (defaults, source, current) and the entity's
// capability handle. Dirty tracking is a pure diff over these snapshots,
// recomputed on every call.

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use indexmap::IndexMap;
use serde::Serialize;

use crate::error::CoreError;
use crate::model::{Configuration, EntityId, TangentValue};

// ── Tunable capability ──────────────────────────────────────────────

/// What a mounted entity exposes to the engine.
///
/// `on_update` is how the owning UI hears about changes it did not make
/// itself (undo, redo, reset). `on_save` durably persists one key and may fail.
pub trait Tunable: Send + Sync {
    fn on_update(&self, key: &str, value: &TangentValue);

    fn on_save<'a>(
        &'a self,
        key: &'a str,
        value: &'a TangentValue,
    ) -> BoxFuture<'a, Result<(), CoreError>>;
}

// ── Registration ────────────────────────────────────────────────────

/// Everything needed to mount an entity.
#[derive(Clone)]
pub struct Registration {
    pub id: EntityId,
    pub defaults: Configuration,
    pub handle: Arc<dyn Tunable>,
}

impl Registration {
    pub fn new(
        id: impl Into<EntityId>,
        defaults: Configuration,
        handle: Arc<dyn Tunable>,
    ) -> Self {
        Self {
            id: id.into(),
            defaults,
            handle,
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

/// A mounted entity.
pub(crate) struct EntityRecord {
    pub id: EntityId,
    pub defaults: Configuration,
    pub source: Configuration,
    pub current: Configuration,
    pub handle: Arc<dyn Tunable>,
}

impl EntityRecord {
    /// Build a record from a registration and whatever the value store holds.
    ///
    /// Source always starts at the declared defaults. Current starts at the
    /// defaults overlaid with stored values for declared keys; stored keys the
    /// defaults no longer declare are ignored.
    pub fn new(registration: Registration, stored: Option<&Configuration>) -> Self {
        let Registration {
            id,
            defaults,
            handle,
        } = registration;

        let mut current = defaults.clone();
        if let Some(stored) = stored {
            for (key, value) in current.iter_mut() {
                if let Some(saved) = stored.get(key) {
                    value.clone_from(saved);
                }
            }
        }

        Self {
            id,
            source: defaults.clone(),
            defaults,
            current,
            handle,
        }
    }

    fn changes(&self) -> impl Iterator<Item = UnsavedChange> + '_ {
        self.current.iter().filter_map(|(key, new)| {
            let old = self.source.get(key);
            (old != Some(new)).then(|| UnsavedChange {
                entity: self.id.clone(),
                key: key.clone(),
                old: old.cloned(),
                new: new.clone(),
            })
        })
    }

    pub fn is_dirty(&self) -> bool {
        self.changes().next().is_some()
    }

    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id.clone(),
            defaults: self.defaults.clone(),
            source: self.source.clone(),
            current: self.current.clone(),
        }
    }
}

// ── Read-only views ─────────────────────────────────────────────────

/// One (entity, key) pair whose live value differs from its source value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnsavedChange {
    pub entity: EntityId,
    pub key: String,
    /// Source value; `None` when the key was never part of the source.
    pub old: Option<TangentValue>,
    pub new: TangentValue,
}

/// Copy of a record's three configurations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub defaults: Configuration,
    pub source: Configuration,
    pub current: Configuration,
}

// ── Registry ────────────────────────────────────────────────────────

/// Mounted entities in registration order.
#[derive(Default)]
pub(crate) struct Registry {
    records: IndexMap<EntityId, EntityRecord>,
}

impl Registry {
    /// Insert or replace. A replaced entity keeps its original position.
    pub fn insert(&mut self, record: EntityRecord) -> Option<EntityRecord> {
        self.records.insert(record.id.clone(), record)
    }

    pub fn remove(&mut self, id: &EntityId) -> Option<EntityRecord> {
        self.records.shift_remove(id)
    }

    pub fn get(&self, id: &EntityId) -> Option<&EntityRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &EntityId) -> Option<&mut EntityRecord> {
        self.records.get_mut(id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.records.contains_key(id)
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.records.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    // ── Dirty tracking ───────────────────────────────────────────────

    /// Every unsaved change, entities in registration order, keys in
    /// declaration order.
    pub fn unsaved_changes(&self) -> Vec<UnsavedChange> {
        self.records.values().flat_map(EntityRecord::changes).collect()
    }

    pub fn unsaved_changes_for(&self, id: &EntityId) -> Vec<UnsavedChange> {
        self.records
            .get(id)
            .map(|r| r.changes().collect())
            .unwrap_or_default()
    }

    /// Unsaved changes paired with the handle that persists them.
    pub fn pending_saves(
        &self,
        only: Option<&EntityId>,
    ) -> Vec<(UnsavedChange, Arc<dyn Tunable>)> {
        self.records
            .values()
            .filter(|r| only.is_none_or(|id| *id == r.id))
            .flat_map(|r| r.changes().map(|c| (c, Arc::clone(&r.handle))))
            .collect()
    }

    // ── Baseline reconciliation ──────────────────────────────────────

    /// Copy of each in-scope entity's current configuration, taken when a
    /// save batch starts. Committing these later ignores edits made while
    /// the batch was in flight.
    pub fn baselines(&self, only: Option<&EntityId>) -> Vec<(EntityId, Configuration)> {
        self.records
            .values()
            .filter(|r| only.is_none_or(|id| *id == r.id))
            .map(|r| (r.id.clone(), r.current.clone()))
            .collect()
    }

    /// Advance one entity's source baseline to a saved configuration.
    pub fn commit(&mut self, id: &EntityId, saved: &Configuration) -> bool {
        match self.records.get_mut(id) {
            Some(record) => {
                record.source.clone_from(saved);
                true
            }
            None => false,
        }
    }
}
