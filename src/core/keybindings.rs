//! Editor keybindings and chord canonicalization.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::core::input::{Key, KeyEvent, Modifiers};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditAction {
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    DeleteBackward,
    DeleteForward,
    DeleteToLineStart,
    DeleteToLineEnd,
    DeleteWordBackward,
    ClearLine,
    TransposeChars,
    HistoryPrevious,
    HistoryNext,
    CompleteNext,
    CompletePrevious,
}

impl EditAction {
    /// Every action, in the order bindings are resolved.
    pub const ALL: [EditAction; 15] = [
        EditAction::CursorLeft,
        EditAction::CursorRight,
        EditAction::CursorHome,
        EditAction::CursorEnd,
        EditAction::DeleteBackward,
        EditAction::DeleteForward,
        EditAction::DeleteToLineStart,
        EditAction::DeleteToLineEnd,
        EditAction::DeleteWordBackward,
        EditAction::ClearLine,
        EditAction::TransposeChars,
        EditAction::HistoryPrevious,
        EditAction::HistoryNext,
        EditAction::CompleteNext,
        EditAction::CompletePrevious,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EditAction::CursorLeft => "CursorLeft",
            EditAction::CursorRight => "CursorRight",
            EditAction::CursorHome => "CursorHome",
            EditAction::CursorEnd => "CursorEnd",
            EditAction::DeleteBackward => "DeleteBackward",
            EditAction::DeleteForward => "DeleteForward",
            EditAction::DeleteToLineStart => "DeleteToLineStart",
            EditAction::DeleteToLineEnd => "DeleteToLineEnd",
            EditAction::DeleteWordBackward => "DeleteWordBackward",
            EditAction::ClearLine => "ClearLine",
            EditAction::TransposeChars => "TransposeChars",
            EditAction::HistoryPrevious => "HistoryPrevious",
            EditAction::HistoryNext => "HistoryNext",
            EditAction::CompleteNext => "CompleteNext",
            EditAction::CompletePrevious => "CompletePrevious",
        }
    }
}

impl fmt::Display for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EditAction {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        EditAction::ALL
            .into_iter()
            .find(|action| action.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::UnknownAction(trimmed.to_string()))
    }
}

/// Canonical chord string used to look up bindings.
pub type KeyId = String;

/// Canonical chord for a key press.
///
/// Only an exact Control or exact Shift modifier is kept; Alt and combined
/// modifiers collapse to the bare key name, so `Alt+B` looks up as `B`.
pub fn canonical_chord(key: Key, modifiers: Modifiers) -> KeyId {
    if modifiers == Modifiers::CONTROL {
        format!("Control{}", key.name())
    } else if modifiers == Modifiers::SHIFT {
        format!("Shift{}", key.name())
    } else {
        key.name().into_owned()
    }
}

pub fn chord_for_event(event: &KeyEvent) -> KeyId {
    canonical_chord(event.key, event.modifiers)
}

#[derive(Debug, Clone)]
pub enum KeyBinding {
    Single(KeyId),
    Multiple(Vec<KeyId>),
}

impl KeyBinding {
    fn into_keys(self) -> Vec<KeyId> {
        match self {
            KeyBinding::Single(key) => vec![key],
            KeyBinding::Multiple(keys) => keys,
        }
    }
}

impl From<&str> for KeyBinding {
    fn from(value: &str) -> Self {
        KeyBinding::Single(value.to_string())
    }
}

impl From<String> for KeyBinding {
    fn from(value: String) -> Self {
        KeyBinding::Single(value)
    }
}

impl From<Vec<&str>> for KeyBinding {
    fn from(value: Vec<&str>) -> Self {
        KeyBinding::Multiple(value.into_iter().map(|item| item.to_string()).collect())
    }
}

impl From<Vec<String>> for KeyBinding {
    fn from(value: Vec<String>) -> Self {
        KeyBinding::Multiple(value)
    }
}

/// Per-action overrides applied on top of [`DEFAULT_KEYBINDINGS`].
#[derive(Debug, Clone, Default)]
pub struct KeyBindingsConfig {
    entries: HashMap<EditAction, KeyBinding>,
}

impl KeyBindingsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the chords bound to `action`. An empty list unbinds it.
    pub fn set<K: Into<KeyBinding>>(&mut self, action: EditAction, keys: K) {
        self.entries.insert(action, keys.into());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse overrides written as `Action=Chord|Chord;Action=Chord`.
    ///
    /// Action names are case-insensitive; an action with nothing after `=`
    /// is unbound.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut config = Self::new();
        for entry in spec.split(';').map(str::trim).filter(|entry| !entry.is_empty()) {
            let (action, chords) = entry
                .split_once('=')
                .ok_or_else(|| Error::InvalidBinding(entry.to_string()))?;
            if action.trim().is_empty() {
                return Err(Error::InvalidBinding(entry.to_string()));
            }
            let action: EditAction = action.parse()?;
            let keys: Vec<String> = chords
                .split('|')
                .map(str::trim)
                .filter(|chord| !chord.is_empty())
                .map(str::to_string)
                .collect();
            config.set(action, keys);
        }
        Ok(config)
    }
}

pub static DEFAULT_KEYBINDINGS: LazyLock<HashMap<EditAction, Vec<KeyId>>> = LazyLock::new(|| {
    use EditAction::*;

    let mut map = HashMap::new();
    map.insert(CursorLeft, vec!["LeftArrow".to_string(), "ControlB".to_string()]);
    map.insert(CursorRight, vec!["RightArrow".to_string(), "ControlF".to_string()]);
    map.insert(CursorHome, vec!["Home".to_string(), "ControlA".to_string()]);
    map.insert(CursorEnd, vec!["End".to_string(), "ControlE".to_string()]);
    map.insert(DeleteBackward, vec!["Backspace".to_string(), "ControlH".to_string()]);
    map.insert(DeleteForward, vec!["Delete".to_string(), "ControlD".to_string()]);
    map.insert(DeleteToLineStart, vec!["ControlU".to_string()]);
    map.insert(DeleteToLineEnd, vec!["ControlK".to_string()]);
    map.insert(DeleteWordBackward, vec!["ControlW".to_string()]);
    map.insert(ClearLine, vec!["ControlL".to_string(), "Escape".to_string()]);
    map.insert(TransposeChars, vec!["ControlT".to_string()]);
    map.insert(HistoryPrevious, vec!["UpArrow".to_string(), "ControlP".to_string()]);
    map.insert(HistoryNext, vec!["DownArrow".to_string(), "ControlN".to_string()]);
    map.insert(CompleteNext, vec!["Tab".to_string()]);
    map.insert(CompletePrevious, vec!["ShiftTab".to_string()]);

    map
});

/// Immutable chord-to-action table.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    action_to_keys: HashMap<EditAction, Vec<KeyId>>,
    key_to_action: HashMap<KeyId, EditAction>,
}

impl KeyBindings {
    pub fn new(config: KeyBindingsConfig) -> Self {
        let mut action_to_keys: HashMap<EditAction, Vec<KeyId>> = DEFAULT_KEYBINDINGS.clone();
        for (action, binding) in config.entries {
            action_to_keys.insert(action, binding.into_keys());
        }

        // Later actions in `ALL` win when two actions claim one chord.
        let mut key_to_action = HashMap::new();
        for action in EditAction::ALL {
            if let Some(keys) = action_to_keys.get(&action) {
                for key in keys {
                    key_to_action.insert(key.clone(), action);
                }
            }
        }

        Self {
            action_to_keys,
            key_to_action,
        }
    }

    pub fn action_for(&self, chord: &str) -> Option<EditAction> {
        self.key_to_action.get(chord).copied()
    }

    pub fn lookup(&self, event: &KeyEvent) -> Option<EditAction> {
        self.action_for(&chord_for_event(event))
    }

    pub fn get_keys(&self, action: EditAction) -> Vec<KeyId> {
        self.action_to_keys.get(&action).cloned().unwrap_or_default()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new(KeyBindingsConfig::default())
    }
}
