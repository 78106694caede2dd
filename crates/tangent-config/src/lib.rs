//! Shared configuration for Tangent tools.
//!
//! A TOML file in the platform config directory, overridable through
//! `TANGENT_*` environment variables, translated into
//! [`tangent_core::TunerConfig`] and a ready-to-use save client.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tangent_api::{SaveClient, TransportConfig};
use tangent_core::{Keymap, TunerConfig};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "TANGENT_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Top-level configuration.
///
/// ```toml
/// endpoint = "http://localhost:5173/__tangent/save"
/// timeout = 30
/// history_capacity = 100
///
/// [keybindings]
/// redo = "mod+shift+r"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Save endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Save request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Retained undo history.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Value store file. Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,

    /// Prefix for value store keys.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Open the panel on start.
    #[serde(default)]
    pub start_visible: bool,

    /// Action name → chord overrides, e.g. `redo = "mod+shift+r"`.
    #[serde(default)]
    pub keybindings: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout: default_timeout(),
            history_capacity: default_history_capacity(),
            storage_path: None,
            key_prefix: default_key_prefix(),
            start_visible: false,
            keybindings: BTreeMap::new(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:5173/__tangent/save".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_history_capacity() -> usize {
    tangent_core::history::DEFAULT_CAPACITY
}
fn default_key_prefix() -> String {
    tangent_core::DEFAULT_KEY_PREFIX.into()
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "tangent", "tangent")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("tangent");
    p
}

/// Resolve the config file path: `TANGENT_CONFIG`, then platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default value store file under the platform data directory.
pub fn default_storage_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("values.json"),
        |dirs| dirs.data_dir().join("values.json"),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load from the canonical path plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` plus environment. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TANGENT_").ignore(&["config", "keybindings"]));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, falling back to the defaults on any error.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Saving ──────────────────────────────────────────────────────────

/// Serialize config to TOML and write it to the canonical path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Value store file, explicit or default.
    pub fn storage_path(&self) -> PathBuf {
        self.storage_path
            .clone()
            .unwrap_or_else(default_storage_path)
    }

    /// Parsed key bindings: defaults with the configured overrides applied.
    pub fn keymap(&self) -> Result<Keymap, ConfigError> {
        Keymap::default()
            .with_overrides(
                self.keybindings
                    .iter()
                    .map(|(action, chord)| (action.as_str(), chord.as_str())),
            )
            .map_err(|e| ConfigError::Validation {
                field: "keybindings".into(),
                reason: e.to_string(),
            })
    }

    /// Build the engine's runtime settings.
    pub fn to_tuner_config(&self) -> Result<TunerConfig, ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::Validation {
                field: "history_capacity".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(TunerConfig {
            history_capacity: self.history_capacity,
            key_prefix: self.key_prefix.clone(),
            keymap: self.keymap()?,
            start_visible: self.start_visible,
            ..TunerConfig::default()
        })
    }

    pub fn endpoint_url(&self) -> Result<url::Url, ConfigError> {
        self.endpoint.parse().map_err(|_| ConfigError::Validation {
            field: "endpoint".into(),
            reason: format!("invalid URL: {}", self.endpoint),
        })
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig::default().with_timeout(Duration::from_secs(self.timeout))
    }

    /// Client for the configured endpoint.
    pub fn save_client(&self) -> Result<SaveClient, ConfigError> {
        SaveClient::new(self.endpoint_url()?, &self.transport()).map_err(|e| {
            ConfigError::Validation {
                field: "endpoint".into(),
                reason: e.to_string(),
            }
        })
    }
}
