// ── Per-process value store ──
//
// Maps an entity to its live configuration on a storage medium that
// survives a reload of the engine. Every failure degrades: reads return
// `None`, writes are dropped with a warning.

use std::sync::Arc;

use tracing::{debug, warn};

use super::storage::{MemoryStorage, StorageBackend};
use crate::model::{Configuration, EntityId, TangentValue};

/// Default prefix for storage keys (`tangent:<entity>`).
pub const DEFAULT_KEY_PREFIX: &str = "tangent:";

/// Durable entity → configuration mapping.
#[derive(Clone)]
pub struct ValueStore {
    storage: Arc<dyn StorageBackend>,
    prefix: String,
}

impl std::fmt::Debug for ValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueStore")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl Default for ValueStore {
    fn default() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }
}

impl ValueStore {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self::with_prefix(storage, DEFAULT_KEY_PREFIX)
    }

    pub fn with_prefix(storage: Arc<dyn StorageBackend>, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
        }
    }

    fn storage_key(&self, entity: &EntityId) -> String {
        format!("{}{entity}", self.prefix)
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Stored configuration, or `None` if absent, unreadable, or corrupt.
    pub fn get(&self, entity: &EntityId) -> Option<Configuration> {
        let key = self.storage_key(entity);
        let text = match self.storage.get_item(&key) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                warn!(%entity, error = %e, "value store read failed, treating as absent");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(%entity, error = %e, "stored configuration is corrupt, treating as absent");
                None
            }
        }
    }

    /// Entities that currently have a stored configuration.
    pub fn entities(&self) -> Vec<EntityId> {
        match self.storage.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter_map(|k| k.strip_prefix(&self.prefix).map(EntityId::from))
                .collect(),
            Err(e) => {
                warn!(error = %e, "value store listing failed");
                Vec::new()
            }
        }
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Replace the whole configuration. A configuration holding NaN or an
    /// infinity is refused, since JSON would store it as `null`.
    pub fn set(&self, entity: &EntityId, config: &Configuration) {
        if let Some((key, _)) = config.iter().find(|(_, v)| !v.is_finite()) {
            warn!(%entity, key = %key, "non-finite number, write dropped");
            return;
        }
        let text = match serde_json::to_string(config) {
            Ok(text) => text,
            Err(e) => {
                warn!(%entity, error = %e, "could not encode configuration, write dropped");
                return;
            }
        };
        match self.storage.set_item(&self.storage_key(entity), &text) {
            Ok(()) => debug!(%entity, keys = config.len(), "configuration stored"),
            Err(e) => warn!(%entity, error = %e, "value store write failed, dropped"),
        }
    }

    /// Merge one key into the stored configuration, creating it if absent.
    pub fn update(&self, entity: &EntityId, key: &str, value: TangentValue) {
        let mut config = self.get(entity).unwrap_or_default();
        config.insert(key.to_owned(), value);
        self.set(entity, &config);
    }

    /// Delete the stored configuration. Only used for explicit, manual clears.
    pub fn remove(&self, entity: &EntityId) {
        if let Err(e) = self.storage.remove_item(&self.storage_key(entity)) {
            warn!(%entity, error = %e, "value store remove failed");
        }
    }
}
