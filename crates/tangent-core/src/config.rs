// ── Runtime configuration ──
//
// Plain settings consumed by `Tuner::new`. Loading from disk lives in
// `tangent-config`; this crate never touches config files.

use crate::history::DEFAULT_CAPACITY;
use crate::keymap::{Keymap, Platform};
use crate::store::DEFAULT_KEY_PREFIX;

/// Settings for one coordinator instance.
#[derive(Debug, Clone)]
pub struct TunerConfig {
    /// Maximum number of retained history entries.
    pub history_capacity: usize,
    /// Prefix for value-store keys.
    pub key_prefix: String,
    /// Active keyboard shortcuts.
    pub keymap: Keymap,
    /// Decides which physical modifier is "primary".
    pub platform: Platform,
    /// Whether the panel starts open.
    pub start_visible: bool,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            key_prefix: DEFAULT_KEY_PREFIX.to_owned(),
            keymap: Keymap::default(),
            platform: Platform::current(),
            start_visible: false,
        }
    }
}
