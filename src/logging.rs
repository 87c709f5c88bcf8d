//! File-backed tracing setup.
//!
//! stdout and stderr belong to the line being edited, so log output only
//! ever goes to a file.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;
use crate::error::{Error, Result};

/// Install a global subscriber writing to `config.log_file`.
///
/// Returns `Ok(false)` when no log file is configured or a subscriber is
/// already installed. `RUST_LOG` directives override the default level.
pub fn init_logging(config: &EnvConfig) -> Result<bool> {
    match config.log_file.as_deref() {
        Some(path) => init_file_logging(path, default_level(config)),
        None => Ok(false),
    }
}

fn default_level(config: &EnvConfig) -> LevelFilter {
    if config.debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

fn init_file_logging(path: &Path, level: LevelFilter) -> Result<bool> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| Error::LogFile {
            path: path.display().to_string(),
            source,
        })?;

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .is_ok();
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::{default_level, init_logging};
    use crate::config::EnvConfig;
    use crate::error::Error;
    use std::path::PathBuf;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn without_log_file_nothing_is_installed() {
        let config = EnvConfig::default();
        assert!(!init_logging(&config).expect("no-op"));
    }

    #[test]
    fn debug_flag_raises_default_level() {
        let mut config = EnvConfig::default();
        assert_eq!(default_level(&config), LevelFilter::INFO);
        config.debug = true;
        assert_eq!(default_level(&config), LevelFilter::DEBUG);
    }

    #[test]
    fn unopenable_log_file_is_reported() {
        let config = EnvConfig {
            log_file: Some(PathBuf::from("/nonexistent-dir/readline/test.log")),
            ..EnvConfig::default()
        };
        let err = init_logging(&config).expect_err("missing directory");
        assert!(matches!(err, Error::LogFile { ref path, .. } if path.contains("nonexistent-dir")));
    }

    #[test]
    fn second_install_reports_false() {
        let path = std::env::temp_dir().join(format!("tape-readline-{}.log", std::process::id()));
        let config = EnvConfig {
            log_file: Some(path.clone()),
            ..EnvConfig::default()
        };
        init_logging(&config).expect("first install");
        assert!(!init_logging(&config).expect("second install"));
        let _ = std::fs::remove_file(path);
    }
}
