//! Shell-style line editing over an abstract terminal surface.
//!
//! Invariant: after every key press the physical cursor sits at the
//! wrap-aware position of the logical cursor, and the cells from the prompt
//! onward show the buffer.
//!
//! # Public API Overview
//! - Read lines with [`LineReader`] over any [`Terminal`]: the process tty
//!   ([`ProcessTerminal`]) or an in-memory grid ([`VirtualTerminal`]).
//! - Drive a single edit directly with [`LineEditor`].
//! - Offer tab completions through [`AutocompleteProvider`].
//! - Rebind editing keys with [`KeyBindingsConfig`].

pub mod config;
pub mod error;
pub mod logging;

pub mod core;
pub mod editor;
pub mod platform;
pub mod runtime;

/// Crate error and result types.
pub use crate::error::{Error, Result};

/// Environment configuration and log setup.
pub use crate::config::EnvConfig;
pub use crate::logging::init_logging;

/// Autocomplete primitives and providers.
pub use crate::core::autocomplete::{
    token_at, AutocompleteProvider, CommandAutocompleteProvider, StaticAutocompleteProvider,
    DEFAULT_SEPARATORS,
};

/// Cursor mapping helpers.
pub use crate::core::cursor::{offset_position, CursorPos};

/// Keyboard input types and decoding.
pub use crate::core::input::{parse_key_event, Key, KeyEvent, Modifiers};

/// Keybinding configuration and default mappings.
pub use crate::core::keybindings::{
    canonical_chord, chord_for_event, EditAction, KeyBinding, KeyBindings, KeyBindingsConfig,
    KeyId, DEFAULT_KEYBINDINGS,
};

/// Terminal interface and implementations.
pub use crate::core::terminal::Terminal;
pub use crate::platform::stdin_buffer::StdinBuffer;
pub use crate::platform::{ProcessTerminal, VirtualTerminal};

/// Editing state machine.
pub use crate::editor::{CompletionSession, EditBuffer, LineEditor};

/// Prompt-and-read front end.
pub use crate::runtime::LineReader;
