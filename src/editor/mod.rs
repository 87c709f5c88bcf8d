//! Line editing state machine.
//!
//! Invariant: the physical cursor reported by the terminal always sits at the
//! mapped position of the logical cursor (`buffer.cursor()`), computed from
//! the current physical position through [`offset_position`].

pub mod buffer;
pub mod completion;

use std::io;

use tracing::{debug, trace};

use crate::core::autocomplete::AutocompleteProvider;
use crate::core::cursor::{offset_position, CursorPos};
use crate::core::input::{Key, KeyEvent};
use crate::core::keybindings::{EditAction, KeyBindings};
use crate::core::terminal::Terminal;

pub use buffer::EditBuffer;
pub use completion::CompletionSession;

/// Edits one line against a terminal surface.
///
/// Created per read call: the buffer, history cursor and completion session
/// start fresh and are dropped with the editor.
pub struct LineEditor<'a, T: Terminal + ?Sized> {
    terminal: &'a mut T,
    history: &'a [String],
    keybindings: &'a KeyBindings,
    autocomplete: Option<&'a dyn AutocompleteProvider>,
    buffer: EditBuffer,
    history_index: usize,
    completion: Option<CompletionSession>,
}

impl<'a, T: Terminal + ?Sized> LineEditor<'a, T> {
    pub fn new(
        terminal: &'a mut T,
        history: &'a [String],
        keybindings: &'a KeyBindings,
        autocomplete: Option<&'a dyn AutocompleteProvider>,
    ) -> Self {
        Self {
            terminal,
            history,
            keybindings,
            autocomplete,
            buffer: EditBuffer::new(),
            history_index: history.len(),
            completion: None,
        }
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn into_text(self) -> String {
        self.buffer.text()
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.buffer.cursor()
    }

    pub fn history_index(&self) -> usize {
        self.history_index
    }

    pub fn is_browsing_history(&self) -> bool {
        self.history_index != self.history.len()
    }

    pub fn completion(&self) -> Option<&CompletionSession> {
        self.completion.as_ref()
    }

    pub fn is_completing(&self) -> bool {
        self.completion.is_some()
    }

    pub fn terminal(&self) -> &T {
        &*self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut *self.terminal
    }

    /// Apply one key press.
    pub fn handle(&mut self, event: &KeyEvent) -> io::Result<()> {
        if self.completion.is_some() && event.key != Key::Tab {
            self.completion = None;
        }

        match self.keybindings.lookup(event) {
            Some(action) => {
                trace!(%action, cursor = self.buffer.cursor(), "dispatching edit action");
                self.apply(action)
            }
            None => match event.character {
                Some(ch) if !ch.is_control() => self.insert_char(ch),
                _ => Ok(()),
            },
        }
    }

    fn apply(&mut self, action: EditAction) -> io::Result<()> {
        match action {
            EditAction::CursorLeft => self.move_cursor_left(1),
            EditAction::CursorRight => self.move_cursor_right(1),
            EditAction::CursorHome => self.move_cursor_home(),
            EditAction::CursorEnd => self.move_cursor_end(),
            EditAction::DeleteBackward => self.backspace(1),
            EditAction::DeleteForward => self.delete(),
            EditAction::DeleteToLineStart => self.backspace(self.buffer.cursor()),
            EditAction::DeleteToLineEnd => self.kill_to_end(),
            EditAction::DeleteWordBackward => self.delete_word_backward(),
            EditAction::ClearLine => self.clear_line(),
            EditAction::TransposeChars => self.transpose_chars(),
            EditAction::HistoryPrevious => self.previous_history(),
            EditAction::HistoryNext => self.next_history(),
            EditAction::CompleteNext => self.complete_next(),
            EditAction::CompletePrevious => self.complete_previous(),
        }
    }

    fn position(&self) -> CursorPos {
        CursorPos::new(self.terminal.cursor_column(), self.terminal.cursor_row())
    }

    fn set_position(&mut self, pos: CursorPos) -> io::Result<()> {
        self.terminal.set_cursor_position(pos.col, pos.row)
    }

    fn move_cursor_left(&mut self, count: usize) -> io::Result<()> {
        let count = count.min(self.buffer.cursor());
        if count == 0 {
            return Ok(());
        }
        let delta = -(count as isize);
        let target = offset_position(self.position(), delta, self.terminal.buffer_width());
        self.set_position(target)?;
        self.buffer.shift_cursor(delta);
        Ok(())
    }

    fn move_cursor_right(&mut self, count: usize) -> io::Result<()> {
        let count = count.min(self.buffer.limit() - self.buffer.cursor());
        if count == 0 {
            return Ok(());
        }
        let delta = count as isize;
        let target = offset_position(self.position(), delta, self.terminal.buffer_width());
        self.set_position(target)?;
        self.buffer.shift_cursor(delta);
        Ok(())
    }

    fn move_cursor_home(&mut self) -> io::Result<()> {
        self.move_cursor_left(self.buffer.cursor())
    }

    fn move_cursor_end(&mut self) -> io::Result<()> {
        self.move_cursor_right(self.buffer.limit() - self.buffer.cursor())
    }

    fn insert_char(&mut self, ch: char) -> io::Result<()> {
        if self.buffer.is_end() {
            self.buffer.insert(ch);
            let mut encoded = [0u8; 4];
            self.terminal.write(ch.encode_utf8(&mut encoded))?;
            self.buffer.shift_cursor(1);
            return Ok(());
        }

        let mut repaint = String::with_capacity(self.buffer.len() - self.buffer.cursor() + 1);
        repaint.push(ch);
        repaint.push_str(&self.buffer.suffix(self.buffer.cursor()));
        self.buffer.insert(ch);
        self.repaint_in_place(&repaint)?;
        self.move_cursor_right(1)
    }

    /// Write `text` at the cursor and step back to where it began. The step
    /// back is measured from where the write ended, so a scroll at the
    /// bottom row moves the restore point with the text.
    fn repaint_in_place(&mut self, text: &str) -> io::Result<()> {
        self.terminal.write(text)?;
        let written = text.chars().count() as isize;
        let origin = offset_position(self.position(), -written, self.terminal.buffer_width());
        self.set_position(origin)
    }

    fn write_string(&mut self, text: &str) -> io::Result<()> {
        for ch in text.chars() {
            self.insert_char(ch)?;
        }
        Ok(())
    }

    fn write_new_string(&mut self, text: &str) -> io::Result<()> {
        self.clear_line()?;
        self.write_string(text)
    }

    fn backspace(&mut self, count: usize) -> io::Result<()> {
        let count = count.min(self.buffer.cursor());
        if count == 0 {
            return Ok(());
        }
        self.move_cursor_left(count)?;
        self.buffer.remove(count);

        let mut repaint = self.buffer.suffix(self.buffer.cursor());
        repaint.extend(std::iter::repeat(' ').take(count));
        self.repaint_in_place(&repaint)
    }

    fn delete(&mut self) -> io::Result<()> {
        if self.buffer.is_end() {
            return Ok(());
        }
        self.buffer.remove(1);

        let mut repaint = self.buffer.suffix(self.buffer.cursor());
        repaint.push(' ');
        self.repaint_in_place(&repaint)
    }

    fn delete_word_backward(&mut self) -> io::Result<()> {
        while !self.buffer.is_start() && self.buffer.char_before_cursor() != Some(' ') {
            self.backspace(1)?;
        }
        Ok(())
    }

    fn kill_to_end(&mut self) -> io::Result<()> {
        let origin = self.buffer.cursor();
        self.move_cursor_end()?;
        self.backspace(self.buffer.cursor() - origin)
    }

    fn clear_line(&mut self) -> io::Result<()> {
        self.move_cursor_end()?;
        self.backspace(self.buffer.cursor())
    }

    fn transpose_chars(&mut self) -> io::Result<()> {
        if self.buffer.is_start() || self.buffer.limit() < 2 {
            return Ok(());
        }

        let cursor = self.buffer.cursor();
        let (first, second) = if self.buffer.is_end() {
            (cursor - 2, cursor - 1)
        } else {
            (cursor - 1, cursor)
        };
        self.buffer.swap(first, second);

        let text = self.buffer.text();
        self.write_new_string(&text)?;

        // One past the swapped pair; never beyond end of line.
        let target = (second + 1).min(self.buffer.limit());
        self.move_cursor_left(self.buffer.limit() - target)
    }

    fn previous_history(&mut self) -> io::Result<()> {
        if self.history_index == 0 {
            return Ok(());
        }
        self.history_index -= 1;
        let history = self.history;
        self.write_new_string(&history[self.history_index])
    }

    fn next_history(&mut self) -> io::Result<()> {
        let history = self.history;
        if self.history_index >= history.len() {
            return Ok(());
        }
        self.history_index += 1;
        if self.history_index == history.len() {
            self.clear_line()
        } else {
            self.write_new_string(&history[self.history_index])
        }
    }

    fn replace_completion(&mut self, start_offset: usize, candidate: &str) -> io::Result<()> {
        self.backspace(self.buffer.cursor().saturating_sub(start_offset))?;
        self.write_string(candidate)
    }

    fn complete_next(&mut self) -> io::Result<()> {
        if let Some(mut session) = self.completion.take() {
            let candidate = session.advance().to_string();
            self.replace_completion(session.start_offset(), &candidate)?;
            self.completion = Some(session);
            return Ok(());
        }

        let Some(provider) = self.autocomplete else {
            return Ok(());
        };
        if !self.buffer.is_end() {
            return Ok(());
        }

        let separators = provider.separators();
        let start_offset = self
            .buffer
            .chars()
            .iter()
            .rposition(|ch| separators.contains(ch))
            .map_or(0, |index| index + 1);

        let text = self.buffer.text();
        let Some(session) = provider
            .get_suggestions(&text, start_offset)
            .and_then(|candidates| CompletionSession::start(candidates, start_offset))
        else {
            return Ok(());
        };

        debug!(
            candidates = session.len(),
            start_offset, "completion session started"
        );
        let candidate = session.current().to_string();
        self.replace_completion(start_offset, &candidate)?;
        self.completion = Some(session);
        Ok(())
    }

    fn complete_previous(&mut self) -> io::Result<()> {
        let Some(mut session) = self.completion.take() else {
            return Ok(());
        };
        let candidate = session.retreat().to_string();
        self.replace_completion(session.start_offset(), &candidate)?;
        self.completion = Some(session);
        Ok(())
    }
}
