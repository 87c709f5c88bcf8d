//! Crate error type.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Failure reported by the terminal surface, passed through untouched.
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("unknown editor action `{0}`")]
    UnknownAction(String),

    #[error("invalid key binding entry `{0}` (expected `Action=Chord|Chord`)")]
    InvalidBinding(String),

    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: String,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
