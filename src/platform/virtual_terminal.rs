//! In-memory terminal surface with a scripted key queue.

use std::collections::VecDeque;
use std::io;

use crate::core::input::KeyEvent;
use crate::core::terminal::Terminal;

const PASSWORD_PLACEHOLDER: char = '*';

#[derive(Debug, Clone)]
enum ScriptedInput {
    Key(KeyEvent),
    Error(io::ErrorKind),
}

/// Cell grid that renders writes the way a console does: one character per
/// cell, immediate wrap at the right edge, scroll at the bottom row.
///
/// Keys are served from a script; reading past its end fails with
/// `UnexpectedEof`.
#[derive(Debug, Clone)]
pub struct VirtualTerminal {
    width: usize,
    height: usize,
    cells: Vec<Vec<char>>,
    column: usize,
    row: usize,
    password_mode: bool,
    script: VecDeque<ScriptedInput>,
    transcript: String,
    starts: usize,
    stops: usize,
}

impl VirtualTerminal {
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![vec![' '; width]; height],
            column: 0,
            row: 0,
            password_mode: false,
            script: VecDeque::new(),
            transcript: String::new(),
            starts: 0,
            stops: 0,
        }
    }

    pub fn push_key(&mut self, event: KeyEvent) {
        self.script.push_back(ScriptedInput::Key(event));
    }

    pub fn push_keys<I: IntoIterator<Item = KeyEvent>>(&mut self, events: I) {
        for event in events {
            self.push_key(event);
        }
    }

    /// Queue one key press per character of `text`.
    pub fn push_text(&mut self, text: &str) {
        self.push_keys(text.chars().map(KeyEvent::from_char));
    }

    /// Queue a read failure.
    pub fn push_error(&mut self, kind: io::ErrorKind) {
        self.script.push_back(ScriptedInput::Error(kind));
    }

    pub fn pending_keys(&self) -> usize {
        self.script.len()
    }

    /// Row contents with trailing blanks removed.
    pub fn line(&self, row: usize) -> String {
        self.cells
            .get(row)
            .map(|cells| cells.iter().collect::<String>().trim_end().to_string())
            .unwrap_or_default()
    }

    pub fn screen(&self) -> Vec<String> {
        (0..self.height).map(|row| self.line(row)).collect()
    }

    /// Everything written so far, as rendered (placeholders under password mode).
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn start_count(&self) -> usize {
        self.starts
    }

    pub fn stop_count(&self) -> usize {
        self.stops
    }

    fn advance_row(&mut self) {
        self.row += 1;
        if self.row >= self.height {
            self.cells.remove(0);
            self.cells.push(vec![' '; self.width]);
            self.row = self.height - 1;
        }
    }

    fn put_char(&mut self, ch: char) {
        self.cells[self.row][self.column] = ch;
        self.transcript.push(ch);
        self.column += 1;
        if self.column >= self.width {
            self.column = 0;
            self.advance_row();
        }
    }

    fn line_break(&mut self) {
        self.transcript.push('\n');
        self.column = 0;
        self.advance_row();
    }
}

impl Terminal for VirtualTerminal {
    fn start(&mut self) -> io::Result<()> {
        self.starts += 1;
        Ok(())
    }

    fn stop(&mut self) -> io::Result<()> {
        self.stops += 1;
        Ok(())
    }

    fn cursor_column(&self) -> usize {
        self.column
    }

    fn cursor_row(&self) -> usize {
        self.row
    }

    fn buffer_width(&self) -> usize {
        self.width
    }

    fn buffer_height(&self) -> usize {
        self.height
    }

    fn set_cursor_position(&mut self, column: usize, row: usize) -> io::Result<()> {
        if column >= self.width || row >= self.height {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "cursor position ({column}, {row}) outside {}x{} buffer",
                    self.width, self.height
                ),
            ));
        }
        self.column = column;
        self.row = row;
        Ok(())
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        for ch in text.chars() {
            match ch {
                '\n' => self.line_break(),
                // Blanks erase stale cells, so they are never masked.
                ' ' if self.password_mode => self.put_char(' '),
                _ if self.password_mode => self.put_char(PASSWORD_PLACEHOLDER),
                _ => self.put_char(ch),
            }
        }
        Ok(())
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.write(text)?;
        self.line_break();
        Ok(())
    }

    fn password_mode(&self) -> bool {
        self.password_mode
    }

    fn set_password_mode(&mut self, enabled: bool) {
        self.password_mode = enabled;
    }

    fn read_key(&mut self, _intercept: bool) -> io::Result<KeyEvent> {
        match self.script.pop_front() {
            Some(ScriptedInput::Key(event)) => Ok(event),
            Some(ScriptedInput::Error(kind)) => Err(io::Error::new(kind, "scripted read failure")),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "key script exhausted",
            )),
        }
    }
}
