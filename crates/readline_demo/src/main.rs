use std::io;

use tape_readline::{init_logging, AutocompleteProvider, EnvConfig, LineReader, DEFAULT_SEPARATORS};
use tracing::info;

/// Offers git subcommands once the line starts with `git `.
struct GitCompletions;

impl AutocompleteProvider for GitCompletions {
    fn separators(&self) -> &[char] {
        &DEFAULT_SEPARATORS
    }

    fn get_suggestions(&self, text: &str, _start_offset: usize) -> Option<Vec<String>> {
        if text.starts_with("git ") {
            Some(
                ["init", "clone", "pull", "push"]
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            )
        } else {
            None
        }
    }
}

fn main() -> io::Result<()> {
    let config = EnvConfig::from_env();
    init_logging(&config).map_err(io::Error::other)?;

    let mut reader = LineReader::stdio(&config).map_err(io::Error::other)?;
    reader.set_autocomplete(Some(Box::new(GitCompletions)));
    reader.add_history(["ls -a", "dotnet run", "git init"]);

    println!("ReadLine Library Demo");
    println!("---------------------");
    println!();

    let input = reader.read("(prompt)> ", "").map_err(io::Error::other)?;
    println!("{input}");

    let password = reader
        .read_password("Enter Password> ")
        .map_err(io::Error::other)?;
    println!("{password}");

    info!(history = reader.history().len(), "demo finished");
    Ok(())
}
