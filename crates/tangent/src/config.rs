//! CLI configuration: thin wrapper around `tangent_config`.
//!
//! Applies `GlobalOpts` flag overrides (--endpoint, --storage, --timeout)
//! on top of the file + environment configuration.

use std::sync::Arc;

use tangent_core::{FileStorage, StorageBackend, ValueStore};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use tangent_config::{Config, config_path, load_config, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Load config and apply flag overrides. Flags win over env, env over file.
pub fn resolve(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = load_config()?;
    if let Some(ref endpoint) = global.endpoint {
        cfg.endpoint.clone_from(endpoint);
    }
    if let Some(ref storage) = global.storage {
        cfg.storage_path = Some(storage.clone());
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }
    Ok(cfg)
}

/// Storage medium shared with running sessions.
pub fn storage(cfg: &Config) -> Arc<dyn StorageBackend> {
    Arc::new(FileStorage::new(cfg.storage_path()))
}

/// Value store over the configured file.
pub fn value_store(cfg: &Config) -> ValueStore {
    ValueStore::with_prefix(storage(cfg), cfg.key_prefix.clone())
}
