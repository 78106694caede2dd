// ── Core error types ──
//
// Errors surfaced by the engine. Transport details from `tangent_api`
// are folded into `Api` / `Timeout` so callers match on engine-level
// variants only. Storage problems never appear here: an unreadable or
// unwritable medium degrades to "absent" inside the value store.

use thiserror::Error;

use crate::model::EntityId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Save reconciliation ──────────────────────────────────────────
    /// One `on_save` in a batch failed; the whole batch was abandoned.
    #[error("Saving {entity}.{key} failed: {message}")]
    SaveFailed {
        entity: EntityId,
        key: String,
        message: String,
    },

    // ── Registry ─────────────────────────────────────────────────────
    #[error("Entity not registered: {entity}")]
    NotRegistered { entity: EntityId },

    // ── Scope ────────────────────────────────────────────────────────
    /// The coordinator was requested outside an installed scope.
    #[error("No tuner is installed on this thread; wrap the call in a tuner scope")]
    OutsideScope,

    // ── Key bindings ─────────────────────────────────────────────────
    #[error("Invalid key chord '{chord}': {reason}")]
    InvalidChord { chord: String, reason: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Save endpoint error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Save endpoint timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<tangent_api::Error> for CoreError {
    fn from(err: tangent_api::Error) -> Self {
        match err {
            tangent_api::Error::Rejected { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            tangent_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            tangent_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid endpoint URL: {e}"),
            },
            tangent_api::Error::ClientBuild(message) => CoreError::Config { message },
            tangent_api::Error::Transport(ref e) => CoreError::Api {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            tangent_api::Error::Serialization(e) => CoreError::Api {
                message: format!("Could not encode save request: {e}"),
                status: None,
            },
        }
    }
}
