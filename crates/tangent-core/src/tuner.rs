// ── Tuner coordinator ──
//
// Owns the history log, value store, and registry for one running
// application. All three are mutated behind a single mutex; the lock is
// released before any entity callback runs and is never held across an
// `on_save` await. Consumers observe state through `watch` channels and a
// `broadcast` event stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use strum::Display;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use crate::config::TunerConfig;
use crate::error::CoreError;
use crate::history::{HistoryEntry, HistoryLog, HistoryStatus};
use crate::keymap::{Action, KeyChord, KeyInput, KeyOutcome};
use crate::model::{Configuration, EntityId, TangentValue};
use crate::registry::{EntityRecord, EntitySnapshot, Registration, Registry, UnsavedChange};
use crate::store::{MemoryStorage, StorageBackend, ValueStore};

const EVENT_CHANNEL_SIZE: usize = 256;

// ── Observable state ────────────────────────────────────────────────

/// Global save state. Only one batch runs at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SaveState {
    #[default]
    Idle,
    Saving,
}

/// Overlay visibility toggled from the keyboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PanelState {
    pub visible: bool,
    pub show_spacing: bool,
}

/// What caused a value to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
pub enum ChangeOrigin {
    Edit,
    Undo,
    Redo,
    Untracked,
}

/// Broadcast notifications for passive observers (logging, dev panels).
#[derive(Debug, Clone, PartialEq)]
pub enum TunerEvent {
    Registered {
        entity: EntityId,
    },
    Unregistered {
        entity: EntityId,
    },
    ValueChanged {
        entity: EntityId,
        key: String,
        value: TangentValue,
        origin: ChangeOrigin,
    },
    Saved {
        /// `None` for a save-all batch.
        entity: Option<EntityId>,
        count: usize,
    },
    SaveFailed {
        entity: EntityId,
        key: String,
        message: String,
    },
    SectionReset {
        entity: EntityId,
    },
}

/// Result of a save request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Every unsaved change in scope was persisted.
    Saved { count: usize },
    /// Nothing in scope was dirty.
    NothingToSave,
    /// Another batch was already running; this request was dropped.
    AlreadySaving,
}

// ── Tuner ───────────────────────────────────────────────────────────

/// The engine entry point.
///
/// Cheaply cloneable via `Arc<TunerInner>`. One instance per running
/// application; install it with [`crate::scope::enter`] so that deeply nested
/// entities can find it.
#[derive(Clone)]
pub struct Tuner {
    inner: Arc<TunerInner>,
}

struct TunerInner {
    config: TunerConfig,
    engine: Mutex<Engine>,
    saving: AtomicBool,
    history_status: watch::Sender<HistoryStatus>,
    save_state: watch::Sender<SaveState>,
    panel: watch::Sender<PanelState>,
    event_tx: broadcast::Sender<TunerEvent>,
}

struct Engine {
    history: HistoryLog,
    store: ValueStore,
    registry: Registry,
}

impl Default for Tuner {
    fn default() -> Self {
        Self::in_memory(TunerConfig::default())
    }
}

impl std::fmt::Debug for Tuner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tuner")
            .field("config", &self.inner.config)
            .field("saving", &self.is_saving())
            .finish_non_exhaustive()
    }
}

impl Tuner {
    /// Create a coordinator over the given storage medium.
    pub fn new(config: TunerConfig, storage: Arc<dyn StorageBackend>) -> Self {
        let store = ValueStore::with_prefix(storage, config.key_prefix.clone());
        let history = HistoryLog::new(config.history_capacity);
        let (history_status, _) = watch::channel(history.status());
        let (save_state, _) = watch::channel(SaveState::Idle);
        let (panel, _) = watch::channel(PanelState {
            visible: config.start_visible,
            show_spacing: false,
        });
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);

        Self {
            inner: Arc::new(TunerInner {
                config,
                engine: Mutex::new(Engine {
                    history,
                    store,
                    registry: Registry::default(),
                }),
                saving: AtomicBool::new(false),
                history_status,
                save_state,
                panel,
                event_tx,
            }),
        }
    }

    /// Create a coordinator whose values live only as long as the process.
    pub fn in_memory(config: TunerConfig) -> Self {
        Self::new(config, Arc::new(MemoryStorage::new()))
    }

    pub fn config(&self) -> &TunerConfig {
        &self.inner.config
    }

    /// Handle to the value store this coordinator writes through.
    pub fn store(&self) -> ValueStore {
        self.engine().store.clone()
    }

    fn engine(&self) -> MutexGuard<'_, Engine> {
        // A panicking entity callback never runs under this lock, so a
        // poisoned guard still holds consistent state.
        self.inner
            .engine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: TunerEvent) {
        // No subscribers is fine.
        let _ = self.inner.event_tx.send(event);
    }

    // ── Registration ─────────────────────────────────────────────────

    /// Mount an entity and return its initial live configuration.
    ///
    /// A first mount seeds the value store with the defaults. Later mounts
    /// (same process, or a warm reload over shared storage) restore the stored
    /// values onto the declared keys while the source baseline stays at the
    /// defaults, so restored edits show up as unsaved.
    pub fn register(&self, registration: Registration) -> Configuration {
        let id = registration.id.clone();
        let current = {
            let mut engine = self.engine();
            let stored = engine.store.get(&id);
            match &stored {
                None => engine.store.set(&id, &registration.defaults),
                Some(entry) => {
                    // Newly declared keys join the stored entry at their defaults.
                    let mut merged = entry.clone();
                    for (key, value) in &registration.defaults {
                        merged.entry(key.clone()).or_insert_with(|| value.clone());
                    }
                    if merged.len() != entry.len() {
                        engine.store.set(&id, &merged);
                    }
                }
            }
            let record = EntityRecord::new(registration, stored.as_ref());
            let current = record.current.clone();
            if engine.registry.insert(record).is_some() {
                debug!(entity = %id, "replaced existing registration");
            }
            current
        };
        debug!(entity = %id, keys = current.len(), "entity registered");
        self.emit(TunerEvent::Registered { entity: id });
        current
    }

    /// Unmount an entity. Its stored values and history entries remain.
    pub fn unregister(&self, entity: &EntityId) -> bool {
        let removed = self.engine().registry.remove(entity).is_some();
        if removed {
            debug!(%entity, "entity unregistered");
            self.emit(TunerEvent::Unregistered {
                entity: entity.clone(),
            });
        }
        removed
    }

    // ── Edits ────────────────────────────────────────────────────────

    /// Apply a user edit: recorded in history when the value changed.
    pub fn update_value(&self, entity: &EntityId, key: &str, value: impl Into<TangentValue>) {
        self.apply(entity, key, value.into(), ChangeOrigin::Edit);
    }

    /// Apply a change without recording history.
    pub fn update_value_untracked(
        &self,
        entity: &EntityId,
        key: &str,
        value: impl Into<TangentValue>,
    ) {
        self.apply(entity, key, value.into(), ChangeOrigin::Untracked);
    }

    fn apply(&self, entity: &EntityId, key: &str, value: TangentValue, origin: ChangeOrigin) {
        if !value.is_finite() {
            warn!(%entity, key, %value, "non-finite number rejected");
            return;
        }
        let (handle, status) = {
            let mut guard = self.engine();
            let Engine {
                history,
                store,
                registry,
            } = &mut *guard;

            store.update(entity, key, value.clone());

            let Some(record) = registry.get_mut(entity) else {
                debug!(%entity, key, %origin, "entity not mounted, value stored only");
                return;
            };

            let previous = record.current.insert(key.to_owned(), value.clone());
            if origin == ChangeOrigin::Edit {
                match previous {
                    Some(old) if old != value => {
                        history.record(entity.clone(), key, old, value.clone());
                    }
                    Some(_) => {}
                    None => debug!(%entity, key, "undeclared key, edit not recorded"),
                }
            }
            (Arc::clone(&record.handle), history.status())
        };

        self.inner.history_status.send_replace(status);
        debug!(%entity, key, %value, %origin, "value updated");
        handle.on_update(key, &value);
        self.emit(TunerEvent::ValueChanged {
            entity: entity.clone(),
            key: key.to_owned(),
            value,
            origin,
        });
    }

    // ── Undo / redo ──────────────────────────────────────────────────

    /// Revert the most recent edit. Returns the entry that was undone.
    pub fn undo(&self) -> Option<HistoryEntry> {
        let (entry, status) = {
            let mut engine = self.engine();
            let entry = engine.history.undo();
            (entry, engine.history.status())
        };
        self.inner.history_status.send_replace(status);

        let entry = entry?;
        self.apply(
            &entry.entity,
            &entry.key,
            entry.old_value.clone(),
            ChangeOrigin::Undo,
        );
        Some(entry)
    }

    /// Re-apply the most recently undone edit.
    pub fn redo(&self) -> Option<HistoryEntry> {
        let (entry, status) = {
            let mut engine = self.engine();
            let entry = engine.history.redo();
            (entry, engine.history.status())
        };
        self.inner.history_status.send_replace(status);

        let entry = entry?;
        self.apply(
            &entry.entity,
            &entry.key,
            entry.new_value.clone(),
            ChangeOrigin::Redo,
        );
        Some(entry)
    }

    pub fn history_status(&self) -> HistoryStatus {
        *self.inner.history_status.borrow()
    }

    /// Retained history, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.engine().history.entries().cloned().collect()
    }

    pub fn clear_history(&self) {
        let status = {
            let mut engine = self.engine();
            engine.history.reset();
            engine.history.status()
        };
        self.inner.history_status.send_replace(status);
    }

    // ── Registry reads ───────────────────────────────────────────────

    /// Mounted entities in registration order.
    pub fn entities(&self) -> Vec<EntityId> {
        self.engine().registry.ids()
    }

    pub fn entity_count(&self) -> usize {
        self.engine().registry.len()
    }

    pub fn contains(&self, entity: &EntityId) -> bool {
        self.engine().registry.contains(entity)
    }

    pub fn snapshot(&self, entity: &EntityId) -> Option<EntitySnapshot> {
        self.engine().registry.get(entity).map(EntityRecord::snapshot)
    }

    pub fn is_dirty(&self, entity: &EntityId) -> bool {
        self.engine()
            .registry
            .get(entity)
            .is_some_and(EntityRecord::is_dirty)
    }

    pub fn unsaved_changes(&self) -> Vec<UnsavedChange> {
        self.engine().registry.unsaved_changes()
    }

    pub fn unsaved_changes_for(&self, entity: &EntityId) -> Vec<UnsavedChange> {
        self.engine().registry.unsaved_changes_for(entity)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        !self.unsaved_changes().is_empty()
    }

    // ── Save reconciliation ──────────────────────────────────────────

    pub fn is_saving(&self) -> bool {
        self.inner.saving.load(Ordering::Acquire)
    }

    /// Persist every unsaved change across all entities.
    pub async fn save_all(&self) -> Result<SaveOutcome, CoreError> {
        self.run_save(None).await
    }

    /// Persist the unsaved changes of one entity.
    pub async fn save_section(&self, entity: &EntityId) -> Result<SaveOutcome, CoreError> {
        self.run_save(Some(entity)).await
    }

    async fn run_save(&self, only: Option<&EntityId>) -> Result<SaveOutcome, CoreError> {
        if self
            .inner
            .saving
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("save already in flight, request dropped");
            return Ok(SaveOutcome::AlreadySaving);
        }
        let _saving = SavingGuard(&self.inner);

        let (batch, baselines) = {
            let engine = self.engine();
            (
                engine.registry.pending_saves(only),
                engine.registry.baselines(only),
            )
        };
        if batch.is_empty() {
            debug!(scope = ?only, "nothing to save");
            return Ok(SaveOutcome::NothingToSave);
        }

        self.inner.save_state.send_replace(SaveState::Saving);
        info!(changes = batch.len(), scope = ?only, "saving");

        for (change, handle) in &batch {
            if let Err(e) = handle.on_save(&change.key, &change.new).await {
                let message = e.to_string();
                error!(
                    entity = %change.entity,
                    key = %change.key,
                    error = %message,
                    "save failed, batch abandoned"
                );
                self.emit(TunerEvent::SaveFailed {
                    entity: change.entity.clone(),
                    key: change.key.clone(),
                    message: message.clone(),
                });
                return Err(CoreError::SaveFailed {
                    entity: change.entity.clone(),
                    key: change.key.clone(),
                    message,
                });
            }
            debug!(entity = %change.entity, key = %change.key, "key saved");
        }

        // Commit the batch snapshot. Edits made while it was in flight stay unsaved.
        {
            let mut engine = self.engine();
            for (entity, saved) in &baselines {
                engine.registry.commit(entity, saved);
            }
        }

        let count = batch.len();
        info!(count, "save complete");
        self.emit(TunerEvent::Saved {
            entity: only.cloned(),
            count,
        });
        Ok(SaveOutcome::Saved { count })
    }

    // ── Reset ────────────────────────────────────────────────────────

    /// Discard live edits of one entity, returning it to its source baseline.
    /// History is left alone.
    pub fn reset_section(&self, entity: &EntityId) -> bool {
        let (handle, source) = {
            let mut guard = self.engine();
            let Engine {
                store, registry, ..
            } = &mut *guard;
            let Some(record) = registry.get_mut(entity) else {
                return false;
            };
            record.current.clone_from(&record.source);
            store.set(entity, &record.source);
            (Arc::clone(&record.handle), record.source.clone())
        };

        for (key, value) in &source {
            handle.on_update(key, value);
        }
        debug!(%entity, keys = source.len(), "section reset");
        self.emit(TunerEvent::SectionReset {
            entity: entity.clone(),
        });
        true
    }

    /// Reset every mounted entity. Returns how many were reset.
    pub fn reset_all(&self) -> usize {
        let ids = self.engine().registry.ids();
        ids.iter().filter(|id| self.reset_section(id)).count()
    }

    // ── Panel & keyboard ─────────────────────────────────────────────

    pub fn panel_state(&self) -> PanelState {
        *self.inner.panel.borrow()
    }

    /// Flip panel visibility, returning the new value.
    pub fn toggle_panel(&self) -> bool {
        let mut visible = false;
        self.inner.panel.send_modify(|p| {
            p.visible = !p.visible;
            visible = p.visible;
        });
        visible
    }

    /// Flip the spacing overlay, returning the new value.
    pub fn toggle_spacing(&self) -> bool {
        let mut shown = false;
        self.inner.panel.send_modify(|p| {
            p.show_spacing = !p.show_spacing;
            shown = p.show_spacing;
        });
        shown
    }

    /// Resolve a chord through the keymap and perform its action.
    pub async fn handle_key(&self, chord: &KeyChord) -> Option<KeyOutcome> {
        let action = self.inner.config.keymap.resolve(chord)?;
        debug!(%chord, %action, "shortcut");
        match action {
            Action::TogglePanel => {
                self.toggle_panel();
            }
            Action::Undo => {
                self.undo();
            }
            Action::Redo => {
                self.redo();
            }
            Action::SaveAll => match self.save_all().await {
                Ok(outcome) => debug!(?outcome, "shortcut save finished"),
                Err(e) => debug!(error = %e, "shortcut save failed"),
            },
            Action::ToggleSpacing => {
                self.toggle_spacing();
            }
        }
        Some(KeyOutcome {
            action,
            prevent_default: true,
        })
    }

    /// Like [`handle_key`](Self::handle_key), starting from a raw key press.
    pub async fn handle_input(&self, input: &KeyInput) -> Option<KeyOutcome> {
        let chord = KeyChord::from_input(input, self.inner.config.platform);
        self.handle_key(&chord).await
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_history(&self) -> watch::Receiver<HistoryStatus> {
        self.inner.history_status.subscribe()
    }

    pub fn subscribe_save_state(&self) -> watch::Receiver<SaveState> {
        self.inner.save_state.subscribe()
    }

    pub fn subscribe_panel(&self) -> watch::Receiver<PanelState> {
        self.inner.panel.subscribe()
    }

    /// Subscribe to the event broadcast stream.
    pub fn events(&self) -> broadcast::Receiver<TunerEvent> {
        self.inner.event_tx.subscribe()
    }
}

/// Returns the coordinator to idle however a save batch ends.
struct SavingGuard<'a>(&'a TunerInner);

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.saving.store(false, Ordering::Release);
        self.0.save_state.send_replace(SaveState::Idle);
    }
}
