//! CLI error types with miette diagnostics.
//!
//! Maps engine, transport, and config errors into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use tangent_config::ConfigError;
use tangent_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(dead_code, unused_assignments)]
pub enum CliError {
    // ── Endpoint ─────────────────────────────────────────────────────

    #[error("Could not reach the save endpoint at {url}")]
    #[diagnostic(
        code(tangent::connection_failed),
        help(
            "Check that the dev server is running and serves the save endpoint.\n\
             URL: {url}\n\
             Override with: tangent --endpoint <URL> ..."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Save endpoint rejected the request: {message}")]
    #[diagnostic(
        code(tangent::rejected),
        help("The endpoint could not rewrite the source file. Check the file path and key.")
    )]
    Rejected { message: String, status: Option<u16> },

    #[error("Saving {entity}.{key} failed: {message}")]
    #[diagnostic(
        code(tangent::save_failed),
        help("Earlier keys may already be written; no further keys were sent.")
    )]
    SaveFailed {
        entity: String,
        key: String,
        message: String,
    },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(tangent::timeout),
        help("Increase timeout with --timeout or check the dev server.")
    )]
    Timeout { seconds: u64 },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(tangent::not_found),
        help("Run: tangent {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(tangent::validation))]
    Validation { field: String, reason: String },

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(tangent::confirmation_required),
        help("Use --yes (-y) to confirm.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(tangent::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(tangent::config))]
    Config(Box<figment::Error>),

    #[error("failed to serialize config: {0}")]
    #[diagnostic(code(tangent::config))]
    ConfigWrite(#[from] toml::ser::Error),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(tangent::json))]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Rejected { .. } | Self::SaveFailed { .. } => exit_code::REJECTED,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ConfigExists { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Convert a transport error, naming the endpoint when it was unreachable.
    pub fn from_api(err: tangent_api::Error, endpoint: &str) -> Self {
        match err {
            tangent_api::Error::Transport(e) => Self::ConnectionFailed {
                url: endpoint.to_owned(),
                source: Box::new(e),
            },
            other => CoreError::from(other).into(),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Figment(e) => Self::Config(e),
            ConfigError::Serialization(e) => Self::ConfigWrite(e),
            ConfigError::Io(e) => Self::Io(e),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SaveFailed {
                entity,
                key,
                message,
            } => Self::SaveFailed {
                entity: entity.to_string(),
                key,
                message,
            },

            CoreError::NotRegistered { entity } => Self::NotFound {
                resource_type: "entity".into(),
                identifier: entity.to_string(),
                list_command: "store list".into(),
            },

            CoreError::Api { message, status } => Self::Rejected { message, status },

            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },

            CoreError::InvalidChord { chord, reason } => Self::Validation {
                field: format!("keybinding '{chord}'"),
                reason,
            },

            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::OutsideScope => Self::Validation {
                field: "scope".into(),
                reason: CoreError::OutsideScope.to_string(),
            },
        }
    }
}
