//! Live-tuning engine between a running UI and its source files.
//!
//! This crate owns the editing state of every tunable entity in one running
//! application:
//!
//! - **[`Tuner`]**: central coordinator. Mounts entities, applies edits,
//!   drives undo/redo through a bounded [`HistoryLog`], and reconciles
//!   unsaved changes with [`save_all()`](Tuner::save_all) as a single-flight
//!   sequential batch. State is observable through `tokio::sync::watch`
//!   channels and a [`TunerEvent`] broadcast.
//!
//! - **[`ValueStore`]**: live values on a [`StorageBackend`] that outlives
//!   the engine, so a reload restores in-progress edits. Storage failures
//!   degrade to "absent", never to errors.
//!
//! - **[`Tunable`]**: capability each entity implements to hear about
//!   externally driven changes and to persist one key. [`SourceEntity`] is
//!   the stock implementation backed by the HTTP save endpoint.
//!
//! - **[`Keymap`]**: platform-neutral shortcuts resolved by
//!   [`Tuner::handle_key`].
//!
//! - **[`scope`]**: thread-local installation of the active coordinator.

pub mod config;
pub mod convert;
pub mod error;
pub mod history;
pub mod keymap;
pub mod model;
pub mod registry;
pub mod scope;
pub mod source;
pub mod store;
pub mod tuner;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::TunerConfig;
pub use error::CoreError;
pub use history::{HistoryEntry, HistoryLog, HistoryStatus};
pub use keymap::{Action, KeyChord, KeyInput, KeyOutcome, Keymap, Platform};
pub use model::{Configuration, EntityId, ParseValueError, TangentValue, ValueKind};
pub use registry::{EntitySnapshot, Registration, Tunable, UnsavedChange};
pub use source::SourceEntity;
pub use store::{
    DEFAULT_KEY_PREFIX, FileStorage, MemoryStorage, StorageBackend, StorageError, ValueStore,
};
pub use tuner::{ChangeOrigin, PanelState, SaveOutcome, SaveState, Tuner, TunerEvent};
