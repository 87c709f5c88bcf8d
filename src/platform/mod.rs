//! Terminal surfaces: the process tty and an in-memory stand-in.

pub mod process_terminal;
pub mod stdin_buffer;
pub mod virtual_terminal;

pub use process_terminal::ProcessTerminal;
pub use virtual_terminal::VirtualTerminal;
