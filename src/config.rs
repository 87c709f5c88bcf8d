//! Environment configuration.

use std::env;
use std::path::PathBuf;

use crate::core::keybindings::KeyBindingsConfig;
use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub history_enabled: bool,
    pub debug: bool,
    pub log_file: Option<PathBuf>,
    pub write_log: Option<PathBuf>,
    pub password_mask: Option<char>,
    pub keybindings: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            history_enabled: env_flag("TAPE_READLINE_HISTORY"),
            debug: env_flag("TAPE_READLINE_DEBUG"),
            log_file: env_string_opt("TAPE_READLINE_LOG").map(PathBuf::from),
            write_log: env_string_opt("TAPE_READLINE_WRITE_LOG").map(PathBuf::from),
            password_mask: env_string_opt("TAPE_READLINE_PASSWORD_MASK")
                .and_then(|value| value.chars().next()),
            keybindings: env_string_opt("TAPE_READLINE_KEYS"),
        }
    }

    /// Parsed keybinding overrides; empty when none are configured.
    pub fn keybindings_config(&self) -> Result<KeyBindingsConfig> {
        match self.keybindings.as_deref() {
            Some(spec) => KeyBindingsConfig::parse(spec),
            None => Ok(KeyBindingsConfig::new()),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
