// ── Value store ──
//
// Durable per-entity configuration on top of a pluggable storage medium.

mod storage;
mod value_store;

pub use storage::{FileStorage, MemoryStorage, StorageBackend, StorageError, StorageResult};
pub use value_store::{DEFAULT_KEY_PREFIX, ValueStore};
