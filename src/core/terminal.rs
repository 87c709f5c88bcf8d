//! Terminal surface consumed by the editor and reader.

use std::io;

use crate::core::input::KeyEvent;

/// Minimal terminal interface for line editing.
///
/// Positions are zero-based cells. Implementations are not required to be
/// safe for concurrent use; one read runs against a surface at a time.
pub trait Terminal {
    /// Prepare the surface for one read (e.g. enter raw mode).
    fn start(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Undo `start`.
    fn stop(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn cursor_column(&self) -> usize;
    fn cursor_row(&self) -> usize;
    fn buffer_width(&self) -> usize;
    fn buffer_height(&self) -> usize;

    /// Move the physical cursor. May be a no-op while password mode is active.
    fn set_cursor_position(&mut self, column: usize, row: usize) -> io::Result<()>;

    /// Write text at the cursor, advancing it. Under password mode each
    /// non-blank character is rendered as the surface's placeholder; blanks
    /// stay blank so repaints can erase cells.
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Write text followed by a line break.
    fn write_line(&mut self, text: &str) -> io::Result<()>;

    fn password_mode(&self) -> bool;
    fn set_password_mode(&mut self, enabled: bool);

    /// Block until the next key press. `intercept` asks the surface not to
    /// echo the key itself.
    fn read_key(&mut self, intercept: bool) -> io::Result<KeyEvent>;
}

impl<T: Terminal + ?Sized> Terminal for &mut T {
    fn start(&mut self) -> io::Result<()> {
        (**self).start()
    }

    fn stop(&mut self) -> io::Result<()> {
        (**self).stop()
    }

    fn cursor_column(&self) -> usize {
        (**self).cursor_column()
    }

    fn cursor_row(&self) -> usize {
        (**self).cursor_row()
    }

    fn buffer_width(&self) -> usize {
        (**self).buffer_width()
    }

    fn buffer_height(&self) -> usize {
        (**self).buffer_height()
    }

    fn set_cursor_position(&mut self, column: usize, row: usize) -> io::Result<()> {
        (**self).set_cursor_position(column, row)
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        (**self).write(text)
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        (**self).write_line(text)
    }

    fn password_mode(&self) -> bool {
        (**self).password_mode()
    }

    fn set_password_mode(&mut self, enabled: bool) {
        (**self).set_password_mode(enabled)
    }

    fn read_key(&mut self, intercept: bool) -> io::Result<KeyEvent> {
        (**self).read_key(intercept)
    }
}
