//! Prompt-and-read front end over a terminal surface.

use tracing::debug;

use crate::config::EnvConfig;
use crate::core::autocomplete::AutocompleteProvider;
use crate::core::input::Key;
use crate::core::keybindings::{KeyBindings, KeyBindingsConfig};
use crate::core::terminal::Terminal;
use crate::editor::LineEditor;
use crate::error::Result;
use crate::platform::ProcessTerminal;

/// Reads edited lines from a terminal, keeping the session history.
///
/// Each call to [`LineReader::read`] or [`LineReader::read_password`] runs a
/// fresh [`LineEditor`] that borrows the history for browsing.
pub struct LineReader<T: Terminal> {
    terminal: T,
    history: Vec<String>,
    history_enabled: bool,
    autocomplete: Option<Box<dyn AutocompleteProvider>>,
    keybindings: KeyBindings,
}

impl<T: Terminal> LineReader<T> {
    pub fn new(terminal: T) -> Self {
        Self {
            terminal,
            history: Vec::new(),
            history_enabled: false,
            autocomplete: None,
            keybindings: KeyBindings::default(),
        }
    }

    /// Reader with history recording and keybinding overrides taken from
    /// `config`.
    pub fn from_config(terminal: T, config: &EnvConfig) -> Result<Self> {
        let mut reader = Self::new(terminal);
        reader.history_enabled = config.history_enabled;
        reader.keybindings = KeyBindings::new(config.keybindings_config()?);
        Ok(reader)
    }

    pub fn with_autocomplete<P: AutocompleteProvider + 'static>(mut self, provider: P) -> Self {
        self.autocomplete = Some(Box::new(provider));
        self
    }

    pub fn set_autocomplete(&mut self, provider: Option<Box<dyn AutocompleteProvider>>) {
        self.autocomplete = provider;
    }

    pub fn autocomplete(&self) -> Option<&dyn AutocompleteProvider> {
        self.autocomplete.as_deref()
    }

    pub fn set_keybindings(&mut self, config: KeyBindingsConfig) {
        self.keybindings = KeyBindings::new(config);
    }

    pub fn keybindings(&self) -> &KeyBindings {
        &self.keybindings
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut Vec<String> {
        &mut self.history
    }

    /// Append entries in order; newest last.
    pub fn add_history<I, S>(&mut self, entries: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.history.extend(entries.into_iter().map(Into::into));
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn history_enabled(&self) -> bool {
        self.history_enabled
    }

    /// Whether lines returned by [`LineReader::read`] are appended to the
    /// history.
    pub fn set_history_enabled(&mut self, enabled: bool) {
        self.history_enabled = enabled;
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }

    pub fn into_terminal(self) -> T {
        self.terminal
    }

    /// Prompt and read one line.
    ///
    /// A blank line is replaced by `default` when `default` is not blank;
    /// the substitute is never recorded in the history.
    pub fn read(&mut self, prompt: &str, default: &str) -> Result<String> {
        let text = self.session(prompt, false)?;
        if text.trim().is_empty() && !default.trim().is_empty() {
            debug!("blank line replaced by default");
            return Ok(default.to_string());
        }
        if self.history_enabled {
            self.history.push(text.clone());
        }
        Ok(text)
    }

    /// Prompt and read one line with echo suppressed. The result is never
    /// recorded in the history.
    pub fn read_password(&mut self, prompt: &str) -> Result<String> {
        self.session(prompt, true)
    }

    fn session(&mut self, prompt: &str, password: bool) -> Result<String> {
        self.terminal.start()?;
        debug!(password, history = self.history.len(), "read started");
        let result = self.prompt_and_edit(prompt, password);
        let stopped = self.terminal.stop();
        let text = result?;
        stopped?;
        Ok(text)
    }

    fn prompt_and_edit(&mut self, prompt: &str, password: bool) -> Result<String> {
        self.terminal.write(prompt)?;
        if !password {
            return self.edit_line();
        }
        self.terminal.set_password_mode(true);
        let result = self.edit_line();
        self.terminal.set_password_mode(false);
        result
    }

    fn edit_line(&mut self) -> Result<String> {
        let mut editor = LineEditor::new(
            &mut self.terminal,
            &self.history,
            &self.keybindings,
            self.autocomplete.as_deref(),
        );
        loop {
            let event = editor.terminal_mut().read_key(true)?;
            if event.key == Key::Enter {
                break;
            }
            editor.handle(&event)?;
        }
        editor.terminal_mut().write_line("")?;
        let text = editor.into_text();
        debug!(chars = text.chars().count(), "read finished");
        Ok(text)
    }
}

impl LineReader<ProcessTerminal> {
    /// Reader over the process tty, configured from `config`.
    pub fn stdio(config: &EnvConfig) -> Result<Self> {
        let terminal = ProcessTerminal::new()
            .with_password_mask(config.password_mask)
            .with_write_log(config.write_log.clone());
        Self::from_config(terminal, config)
    }
}
