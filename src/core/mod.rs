//! Core interfaces and types.

pub mod autocomplete;
pub mod cursor;
pub mod input;
pub mod keybindings;
pub mod terminal;
