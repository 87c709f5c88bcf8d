//! Autocomplete providers.

/// Separators used by the stock providers.
pub const DEFAULT_SEPARATORS: [char; 5] = [' ', '.', '/', '\\', ':'];

/// Source of tab-completion candidates.
pub trait AutocompleteProvider {
    /// Characters that end a completable token.
    fn separators(&self) -> &[char];

    /// Ordered candidates for the token beginning at `start_offset` (a
    /// character index into `text`). `None` or an empty list means no
    /// suggestions.
    fn get_suggestions(&self, text: &str, start_offset: usize) -> Option<Vec<String>>;
}

impl<P: AutocompleteProvider + ?Sized> AutocompleteProvider for Box<P> {
    fn separators(&self) -> &[char] {
        (**self).separators()
    }

    fn get_suggestions(&self, text: &str, start_offset: usize) -> Option<Vec<String>> {
        (**self).get_suggestions(text, start_offset)
    }
}

/// Characters of `text` from `start_offset` on.
pub fn token_at(text: &str, start_offset: usize) -> &str {
    match text.char_indices().nth(start_offset) {
        Some((byte_index, _)) => &text[byte_index..],
        None => "",
    }
}

fn prefix_before(text: &str, start_offset: usize) -> &str {
    match text.char_indices().nth(start_offset) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Offers the same candidates for every request.
#[derive(Debug, Clone)]
pub struct StaticAutocompleteProvider {
    separators: Vec<char>,
    candidates: Vec<String>,
}

impl StaticAutocompleteProvider {
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            separators: DEFAULT_SEPARATORS.to_vec(),
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_separators(mut self, separators: impl Into<Vec<char>>) -> Self {
        self.separators = separators.into();
        self
    }
}

impl AutocompleteProvider for StaticAutocompleteProvider {
    fn separators(&self) -> &[char] {
        &self.separators
    }

    fn get_suggestions(&self, _text: &str, _start_offset: usize) -> Option<Vec<String>> {
        if self.candidates.is_empty() {
            None
        } else {
            Some(self.candidates.clone())
        }
    }
}

#[derive(Debug, Clone)]
struct CommandEntry {
    name: String,
    arguments: Vec<String>,
}

/// Completes command names in the first word and per-command arguments
/// after it, keeping candidates that start with the typed token.
#[derive(Debug, Clone)]
pub struct CommandAutocompleteProvider {
    separators: Vec<char>,
    commands: Vec<CommandEntry>,
}

impl CommandAutocompleteProvider {
    pub fn new() -> Self {
        Self {
            separators: DEFAULT_SEPARATORS.to_vec(),
            commands: Vec::new(),
        }
    }

    pub fn with_separators(mut self, separators: impl Into<Vec<char>>) -> Self {
        self.separators = separators.into();
        self
    }

    /// Register `name` with its argument candidates, in offer order.
    pub fn with_command<I, S>(mut self, name: impl Into<String>, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands.push(CommandEntry {
            name: name.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        });
        self
    }

    fn command_for_line(&self, line: &str) -> Option<&CommandEntry> {
        let first_word = line.split(|ch: char| self.separators.contains(&ch)).next()?;
        self.commands.iter().find(|entry| entry.name == first_word)
    }
}

impl Default for CommandAutocompleteProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AutocompleteProvider for CommandAutocompleteProvider {
    fn separators(&self) -> &[char] {
        &self.separators
    }

    fn get_suggestions(&self, text: &str, start_offset: usize) -> Option<Vec<String>> {
        let token = token_at(text, start_offset);
        let before = prefix_before(text, start_offset);

        let pool: Vec<&str> = if before.trim().is_empty() {
            self.commands.iter().map(|entry| entry.name.as_str()).collect()
        } else {
            let entry = self.command_for_line(before.trim_start())?;
            entry.arguments.iter().map(String::as_str).collect()
        };

        let matches: Vec<String> = pool
            .into_iter()
            .filter(|candidate| candidate.starts_with(token))
            .map(str::to_string)
            .collect();
        if matches.is_empty() {
            None
        } else {
            Some(matches)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        token_at, AutocompleteProvider, CommandAutocompleteProvider, StaticAutocompleteProvider,
    };

    fn git_provider() -> CommandAutocompleteProvider {
        CommandAutocompleteProvider::new()
            .with_command("git", ["init", "clone", "pull", "push"])
            .with_command("cargo", ["build", "bench", "test"])
    }

    #[test]
    fn token_at_counts_characters() {
        assert_eq!(token_at("héllo wörld", 6), "wörld");
        assert_eq!(token_at("abc", 3), "");
        assert_eq!(token_at("abc", 9), "");
    }

    #[test]
    fn static_provider_ignores_input() {
        let provider = StaticAutocompleteProvider::new(["World", "Angel", "Love"]);
        assert_eq!(
            provider.get_suggestions("Hello ", 6),
            Some(vec!["World".to_string(), "Angel".to_string(), "Love".to_string()])
        );
        let empty = StaticAutocompleteProvider::new(Vec::<String>::new());
        assert_eq!(empty.get_suggestions("x", 0), None);
    }

    #[test]
    fn command_arguments_follow_registration_order() {
        let provider = git_provider();
        assert_eq!(
            provider.get_suggestions("git ", 4),
            Some(vec![
                "init".to_string(),
                "clone".to_string(),
                "pull".to_string(),
                "push".to_string()
            ])
        );
        assert_eq!(
            provider.get_suggestions("git pu", 4),
            Some(vec!["pull".to_string(), "push".to_string()])
        );
    }

    #[test]
    fn first_word_completes_command_names() {
        let provider = git_provider();
        assert_eq!(provider.get_suggestions("ca", 0), Some(vec!["cargo".to_string()]));
        assert_eq!(
            provider.get_suggestions("", 0),
            Some(vec!["git".to_string(), "cargo".to_string()])
        );
    }

    #[test]
    fn unknown_commands_have_no_suggestions() {
        let provider = git_provider();
        assert_eq!(provider.get_suggestions("ls ", 3), None);
        assert_eq!(provider.get_suggestions("git zz", 4), None);
    }
}
