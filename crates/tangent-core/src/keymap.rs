// ── Global keyboard shortcuts ──
//
// Chords are platform-neutral: `primary` means Cmd on macOS and Ctrl
// elsewhere. Raw key input is folded into a chord with `KeyChord::from_input`
// and then resolved against the active `Keymap`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::CoreError;

/// Actions reachable from the keyboard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    TogglePanel,
    Undo,
    Redo,
    SaveAll,
    ToggleSpacing,
}

/// Host platform, used to decide which physical modifier is "primary".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Other
        }
    }
}

/// A raw key press as delivered by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyInput {
    pub key: char,
    pub meta: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

/// Platform-neutral key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub primary: bool,
    pub shift: bool,
    pub alt: bool,
    /// Always lowercase.
    pub key: char,
}

impl KeyChord {
    pub const fn new(key: char) -> Self {
        Self {
            primary: false,
            shift: false,
            alt: false,
            key: key.to_ascii_lowercase(),
        }
    }

    pub const fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub const fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub const fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// Fold a raw key press into a chord. On macOS only Meta counts as the
    /// primary modifier; elsewhere only Ctrl does.
    pub fn from_input(input: &KeyInput, platform: Platform) -> Self {
        let primary = match platform {
            Platform::MacOs => input.meta,
            Platform::Other => input.ctrl,
        };
        Self {
            primary,
            shift: input.shift,
            alt: input.alt,
            key: input.key.to_ascii_lowercase(),
        }
    }

    /// Human label for menus and help output, e.g. `⌘⇧Z` or `Ctrl+Shift+Z`.
    pub fn label(&self, platform: Platform) -> String {
        let key = self.key.to_ascii_uppercase();
        match platform {
            Platform::MacOs => {
                let mut out = String::new();
                if self.primary {
                    out.push('⌘');
                }
                if self.alt {
                    out.push('⌥');
                }
                if self.shift {
                    out.push('⇧');
                }
                out.push(key);
                out
            }
            Platform::Other => {
                let mut parts = Vec::with_capacity(4);
                if self.primary {
                    parts.push("Ctrl".to_owned());
                }
                if self.alt {
                    parts.push("Alt".to_owned());
                }
                if self.shift {
                    parts.push("Shift".to_owned());
                }
                parts.push(key.to_string());
                parts.join("+")
            }
        }
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.primary {
            f.write_str("mod+")?;
        }
        if self.alt {
            f.write_str("alt+")?;
        }
        if self.shift {
            f.write_str("shift+")?;
        }
        write!(f, "{}", self.key)
    }
}

impl FromStr for KeyChord {
    type Err = CoreError;

    /// Parse `mod+shift+z` style text. Modifiers are case-insensitive and may
    /// appear in any order; the last segment must be a single character.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CoreError::InvalidChord {
            chord: s.to_owned(),
            reason: reason.to_owned(),
        };

        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let key_part = parts.pop().ok_or_else(|| invalid("empty chord"))?;

        let mut chars = key_part.chars();
        let key = match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_whitespace() => c.to_ascii_lowercase(),
            (None, _) => return Err(invalid("missing key")),
            _ => return Err(invalid("key must be a single character")),
        };

        let mut chord = KeyChord::new(key);
        for modifier in parts {
            match modifier.to_ascii_lowercase().as_str() {
                "mod" | "cmd" | "ctrl" | "primary" => chord.primary = true,
                "shift" => chord.shift = true,
                "alt" | "option" | "opt" => chord.alt = true,
                "" => return Err(invalid("empty modifier")),
                other => return Err(invalid(&format!("unknown modifier '{other}'"))),
            }
        }
        Ok(chord)
    }
}

impl Serialize for KeyChord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyChord {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Result of dispatching a key press. When an action matched, the host's
/// default handling for the press must be suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOutcome {
    pub action: Action,
    pub prevent_default: bool,
}

// ── Keymap ──────────────────────────────────────────────────────────

/// Ordered chord → action table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    bindings: Vec<(KeyChord, Action)>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            bindings: vec![
                (KeyChord::new('t').primary().shift(), Action::TogglePanel),
                (KeyChord::new('z').primary(), Action::Undo),
                (KeyChord::new('z').primary().shift(), Action::Redo),
                (KeyChord::new('y').primary(), Action::Redo),
                (KeyChord::new('s').primary(), Action::SaveAll),
                (KeyChord::new('g').primary().shift(), Action::ToggleSpacing),
            ],
        }
    }
}

impl Keymap {
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Bind a chord. Any previous binding of the same chord is replaced.
    pub fn bind(&mut self, chord: KeyChord, action: Action) {
        self.bindings.retain(|(c, _)| *c != chord);
        self.bindings.push((chord, action));
    }

    /// Replace every chord of `action` with `chord`.
    pub fn rebind(&mut self, action: Action, chord: KeyChord) {
        self.bindings.retain(|(_, a)| *a != action);
        self.bind(chord, action);
    }

    /// Apply textual overrides such as `("redo", "mod+shift+r")`.
    pub fn with_overrides<'a>(
        mut self,
        overrides: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, CoreError> {
        for (action, chord) in overrides {
            let action: Action = action.parse().map_err(|_| CoreError::InvalidChord {
                chord: chord.to_owned(),
                reason: format!("unknown action '{action}'"),
            })?;
            self.rebind(action, chord.parse()?);
        }
        Ok(self)
    }

    pub fn resolve(&self, chord: &KeyChord) -> Option<Action> {
        self.bindings
            .iter()
            .find(|(c, _)| c == chord)
            .map(|(_, a)| *a)
    }

    pub fn chords_for(&self, action: Action) -> impl Iterator<Item = &KeyChord> {
        self.bindings
            .iter()
            .filter(move |(_, a)| *a == action)
            .map(|(c, _)| c)
    }

    pub fn bindings(&self) -> &[(KeyChord, Action)] {
        &self.bindings
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn press(key: char, meta: bool, ctrl: bool, shift: bool) -> KeyInput {
        KeyInput {
            key,
            meta,
            ctrl,
            shift,
            alt: false,
        }
    }

    #[test]
    fn defaults_cover_every_action() {
        let keymap = Keymap::default();
        for action in Action::iter() {
            assert!(keymap.chords_for(action).next().is_some(), "{action} unbound");
        }
    }

    #[test]
    fn primary_modifier_depends_on_platform() {
        let keymap = Keymap::default();
        let cmd_z = press('z', true, false, false);
        let ctrl_z = press('z', false, true, false);

        let mac = KeyChord::from_input(&cmd_z, Platform::MacOs);
        assert_eq!(keymap.resolve(&mac), Some(Action::Undo));
        let mac_ctrl = KeyChord::from_input(&ctrl_z, Platform::MacOs);
        assert_eq!(keymap.resolve(&mac_ctrl), None);

        let linux = KeyChord::from_input(&ctrl_z, Platform::Other);
        assert_eq!(keymap.resolve(&linux), Some(Action::Undo));
        let linux_meta = KeyChord::from_input(&cmd_z, Platform::Other);
        assert_eq!(keymap.resolve(&linux_meta), None);
    }

    #[test]
    fn shift_distinguishes_undo_from_redo() {
        let keymap = Keymap::default();
        let chord = KeyChord::from_input(&press('Z', false, true, true), Platform::Other);
        assert_eq!(keymap.resolve(&chord), Some(Action::Redo));
        assert_eq!(
            keymap.resolve(&KeyChord::new('y').primary()),
            Some(Action::Redo)
        );
    }

    #[test]
    fn parse_and_display() {
        let chord: KeyChord = "Mod+Shift+Z".parse().unwrap();
        assert_eq!(chord, KeyChord::new('z').primary().shift());
        assert_eq!(chord.to_string(), "mod+shift+z");
        assert_eq!("cmd + s".parse::<KeyChord>().unwrap(), KeyChord::new('s').primary());
    }

    #[test]
    fn parse_rejects_bad_chords() {
        assert!("".parse::<KeyChord>().is_err());
        assert!("mod+".parse::<KeyChord>().is_err());
        assert!("mod+enter".parse::<KeyChord>().is_err());
        assert!("hyper+z".parse::<KeyChord>().is_err());
    }

    #[test]
    fn labels() {
        let chord = KeyChord::new('z').primary().shift();
        assert_eq!(chord.label(Platform::MacOs), "⌘⇧Z");
        assert_eq!(chord.label(Platform::Other), "Ctrl+Shift+Z");
    }

    #[test]
    fn overrides_replace_all_chords_of_an_action() {
        let keymap = Keymap::default()
            .with_overrides([("redo", "mod+shift+r")])
            .unwrap();

        assert_eq!(
            keymap.resolve(&KeyChord::new('r').primary().shift()),
            Some(Action::Redo)
        );
        assert_eq!(keymap.resolve(&KeyChord::new('y').primary()), None);
        assert_eq!(keymap.resolve(&KeyChord::new('z').primary().shift()), None);
    }

    #[test]
    fn override_steals_chord_from_other_action() {
        let keymap = Keymap::default()
            .with_overrides([("save-all", "mod+z")])
            .unwrap();
        assert_eq!(
            keymap.resolve(&KeyChord::new('z').primary()),
            Some(Action::SaveAll)
        );
        assert_eq!(keymap.chords_for(Action::Undo).count(), 0);
    }

    #[test]
    fn unknown_action_override_is_rejected() {
        let err = Keymap::default()
            .with_overrides([("explode", "mod+x")])
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidChord { .. }));
    }
}
